use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::domain::Location;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "reporter.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".into(),
            request_timeout_secs: 30,
            latitude: None,
            longitude: None,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// The configured position, if both coordinates are set and in range.
    pub fn location(&self) -> Option<Location> {
        Location::new(self.latitude?, self.longitude?)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Defaults, then the config file, then environment overrides.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();
    apply_file(&mut settings, config_path);
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, path: &Path) {
    let Ok(raw) = fs::read_to_string(path) else {
        return;
    };
    let file_cfg = match toml::from_str::<FileSettings>(&raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config: ignoring unreadable config file");
            return;
        }
    };

    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if file_cfg.latitude.is_some() {
        settings.latitude = file_cfg.latitude;
    }
    if file_cfg.longitude.is_some() {
        settings.longitude = file_cfg.longitude;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => warn!(value = %v, "config: APP__REQUEST_TIMEOUT_SECS is not a number"),
        }
    }

    if let Some(v) = coordinate(&var, "APP__LATITUDE") {
        settings.latitude = Some(v);
    }
    if let Some(v) = coordinate(&var, "APP__LONGITUDE") {
        settings.longitude = Some(v);
    }
}

fn coordinate(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<f64> {
    let raw = var(key)?;
    match raw.parse::<f64>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(key, value = %raw, "config: coordinate is not a number");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
