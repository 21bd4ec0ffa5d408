use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported on this device")]
    Unsupported,
    #[error("user denied geolocation")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timeout expired")]
    Timeout,
}

/// Remote operation a repository failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    DisasterTypes,
    Reports,
    RedZones,
    Submit,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DisasterTypes => "disaster_types",
            Self::Reports => "reports",
            Self::RedZones => "red_zones",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("{operation} request failed: {message}")]
    Network {
        operation: Operation,
        message: String,
    },
    /// Server rejected a submission field (HTTP 4xx).
    #[error("submission rejected: {message}")]
    Validation { message: String },
}

impl RepositoryError {
    pub fn network(operation: Operation, message: impl Into<String>) -> Self {
        Self::Network {
            operation,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::Network { operation, .. } => *operation,
            Self::Validation { .. } => Operation::Submit,
        }
    }

    fn detail(&self) -> &str {
        match self {
            Self::Network { message, .. } | Self::Validation { message } => message,
        }
    }
}

/// Any failure the controller converts into a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Geolocation(#[from] GeolocationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ClientError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Geolocation(GeolocationError::Unsupported) => {
                "Geolocation is not supported on this device.".to_string()
            }
            Self::Geolocation(err) => format!("Error getting location: {err}"),
            Self::Repository(err) => {
                let prefix = match err.operation() {
                    Operation::DisasterTypes => "Error fetching disaster types",
                    Operation::Reports => "Error fetching reports",
                    Operation::RedZones => "Error fetching red zones",
                    Operation::Submit => "Error creating report",
                };
                format!("{prefix}: {}", err.detail())
            }
        }
    }

    /// Short tag used by error reporters that keep history.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Geolocation(_) => "location",
            Self::Repository(RepositoryError::Validation { .. }) => "validation",
            Self::Repository(err) => err.operation().as_str(),
        }
    }
}
