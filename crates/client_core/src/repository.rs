//! Read/write access to the reporting API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{DisasterType, Location, RedZone, Report},
    error::ApiErrorBody,
    protocol::{
        report_form, NearQuery, RedZoneRecord, ReportRecord, DISASTER_TYPES_ROUTE,
        RED_ZONES_ROUTE, REPORTS_ROUTE,
    },
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::{
    draft::NewReport,
    error::{Operation, RepositoryError},
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait DisasterTypeCatalog: Send + Sync {
    async fn fetch_types(&self) -> Result<Vec<DisasterType>, RepositoryError>;
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn fetch_near(&self, location: Location) -> Result<Vec<Report>, RepositoryError>;
    /// Expects a complete report; the repository does not re-validate fields.
    async fn submit(&self, report: &NewReport) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait RedZoneRepository: Send + Sync {
    async fn fetch_near(&self, location: Location) -> Result<Vec<RedZone>, RepositoryError>;
}

#[derive(Debug, Error)]
pub enum HttpSetupError {
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Trims whitespace and trailing slashes; requires an http(s) scheme.
pub fn normalize_base_url(raw: &str) -> Result<String, HttpSetupError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| HttpSetupError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let parsed = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    Ok(trimmed.to_string())
}

/// reqwest-backed implementation of all three repositories.
#[derive(Clone)]
pub struct HttpApi {
    http: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpSetupError> {
        let base_url = normalize_base_url(base_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}{route}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: Operation,
        route: &str,
        query: Option<NearQuery>,
    ) -> Result<T, RepositoryError> {
        let mut request = self.http.get(self.endpoint(route));
        if let Some(query) = query {
            request = request.query(&query);
        }
        debug!(%operation, route, "api: GET");

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(operation, &e))?;
        let response = response
            .error_for_status()
            .map_err(|e| transport_error(operation, &e))?;
        response
            .json::<T>()
            .await
            .map_err(|e| RepositoryError::network(operation, format!("invalid response body: {e}")))
    }
}

fn transport_error(operation: Operation, err: &reqwest::Error) -> RepositoryError {
    if err.is_timeout() {
        return RepositoryError::network(operation, "request timed out");
    }
    RepositoryError::network(operation, err.to_string())
}

async fn submission_failure(response: Response) -> RepositoryError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = ApiErrorBody::message_from(&body)
        .unwrap_or_else(|| format!("server returned {status}"));
    if status.is_client_error() {
        RepositoryError::validation(message)
    } else {
        RepositoryError::network(Operation::Submit, message)
    }
}

#[async_trait]
impl DisasterTypeCatalog for HttpApi {
    async fn fetch_types(&self) -> Result<Vec<DisasterType>, RepositoryError> {
        self.get_json(Operation::DisasterTypes, DISASTER_TYPES_ROUTE, None)
            .await
    }
}

#[async_trait]
impl ReportRepository for HttpApi {
    async fn fetch_near(&self, location: Location) -> Result<Vec<Report>, RepositoryError> {
        let records: Vec<ReportRecord> = self
            .get_json(Operation::Reports, REPORTS_ROUTE, Some(location.into()))
            .await?;

        let reports = records
            .into_iter()
            .filter_map(|record| match Report::try_from(record) {
                Ok(report) => Some(report),
                Err(err) => {
                    warn!(error = %err, "api: skipping report with unusable location");
                    None
                }
            })
            .collect();
        Ok(reports)
    }

    async fn submit(&self, report: &NewReport) -> Result<(), RepositoryError> {
        let mut image = Part::bytes(report.image.bytes.clone())
            .file_name(report.image.filename.clone());
        if let Some(mime_type) = &report.image.mime_type {
            image = image.mime_str(mime_type).map_err(|e| {
                RepositoryError::validation(format!("invalid image mime type '{mime_type}': {e}"))
            })?;
        }

        let form = Form::new()
            .text(report_form::DISASTER_TYPE, report.disaster_type.0.clone())
            .text(report_form::DESCRIPTION, report.description.clone())
            .part(report_form::IMAGE, image)
            .text(report_form::LAT, report.location.lat.to_string())
            .text(report_form::LON, report.location.lon.to_string());

        debug!(
            disaster_type = %report.disaster_type,
            image_bytes = report.image.bytes.len(),
            "api: POST report"
        );
        let response = self
            .http
            .post(self.endpoint(REPORTS_ROUTE))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(Operation::Submit, &e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::REQUEST_TIMEOUT => Err(RepositoryError::network(
                Operation::Submit,
                "request timed out",
            )),
            _ => Err(submission_failure(response).await),
        }
    }
}

#[async_trait]
impl RedZoneRepository for HttpApi {
    async fn fetch_near(&self, location: Location) -> Result<Vec<RedZone>, RepositoryError> {
        let records: Vec<RedZoneRecord> = self
            .get_json(Operation::RedZones, RED_ZONES_ROUTE, Some(location.into()))
            .await?;
        Ok(records.into_iter().map(RedZone::from).collect())
    }
}

#[cfg(test)]
#[path = "tests/repository_tests.rs"]
mod tests;
