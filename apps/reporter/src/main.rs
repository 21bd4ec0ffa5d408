use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    FixedLocationSource, HttpApi, ImageUpload, MapView, RedZoneView, ReportFormView,
    ReportListView, SessionDependencies, SessionState, SubmitOutcome, SyncController,
};
use shared::domain::DisasterType;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(about = "Report disasters and list nearby reports and red zones")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the map, red zone table and report list (default).
    Show,
    /// Submit a report at the session location, then print the refreshed views.
    Submit {
        #[arg(long)]
        disaster_type: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        image: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(url) = args.api_base_url {
        settings.api_base_url = url;
    }
    if args.lat.is_some() {
        settings.latitude = args.lat;
    }
    if args.lon.is_some() {
        settings.longitude = args.lon;
    }

    let api = Arc::new(
        HttpApi::new(&settings.api_base_url, settings.request_timeout())
            .context("failed to configure reporting api client")?,
    );
    info!(api = api.base_url(), "reporter: starting session");

    let controller = SyncController::new(SessionDependencies {
        location: Arc::new(FixedLocationSource::new(settings.location())),
        catalog: api.clone(),
        reports: api.clone(),
        red_zones: api,
    });
    controller.start().await;
    controller.wait_idle().await;

    if let Some(Command::Submit {
        disaster_type,
        description,
        image,
    }) = args.command
    {
        submit(&controller, disaster_type, description, image).await?;
    }

    render(&controller.snapshot().await);
    controller.shutdown().await;
    Ok(())
}

async fn submit(
    controller: &Arc<SyncController>,
    disaster_type: String,
    description: String,
    image: PathBuf,
) -> Result<()> {
    let bytes = tokio::fs::read(&image)
        .await
        .with_context(|| format!("failed to read image '{}'", image.display()))?;
    let filename = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let mime_type = mime_guess::from_path(&image)
        .first()
        .map(|mime| mime.essence_str().to_string());

    if !controller
        .set_disaster_type(Some(DisasterType::new(disaster_type.clone())))
        .await
    {
        let known: Vec<String> = controller
            .snapshot()
            .await
            .disaster_types
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "Unknown disaster type '{disaster_type}'. Available: {}",
            known.join(", ")
        );
        return Ok(());
    }
    controller.set_description(description).await;
    controller
        .set_image(ImageUpload {
            filename,
            mime_type,
            bytes,
        })
        .await;

    match controller.submit().await {
        SubmitOutcome::Submitted => println!("Report submitted."),
        SubmitOutcome::Failed => println!("Report was not created; the draft was kept."),
        SubmitOutcome::NotReady => {
            println!("Report form is incomplete or no location is available.");
            print!("{}", ReportFormView::project(&controller.snapshot().await));
        }
        SubmitOutcome::Cancelled => println!("Session ended before the report was confirmed."),
    }
    controller.wait_idle().await;
    Ok(())
}

fn render(state: &SessionState) {
    if let Some(error) = &state.last_error {
        println!("! {error}");
    }

    println!("== Disaster Map");
    match MapView::project(state) {
        Some(map) => print!("{map}"),
        None => println!("(no location)"),
    }

    println!("== Closest Red Zones");
    print!("{}", RedZoneView::project(state));

    println!("== Recent Reports");
    print!("{}", ReportListView::project(state));
}
