//! One-shot geolocation acquisition.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::domain::Location;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::GeolocationError;

#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Performs exactly one position request. There is no retry.
    async fn acquire(&self) -> Result<Location, GeolocationError>;
}

pub type PositionCallback = Box<dyn FnOnce(f64, f64) + Send>;
pub type PositionErrorCallback = Box<dyn FnOnce(GeolocationError) + Send>;

/// Callback-style device capability: "get current position" with a success
/// and an error callback. At most one of them is expected to fire.
pub trait PositionProvider: Send + Sync {
    fn get_current_position(&self, on_success: PositionCallback, on_error: PositionErrorCallback);
}

/// Adapts a [`PositionProvider`] into an awaitable one-shot acquisition.
pub struct CallbackLocationSource {
    provider: Option<Arc<dyn PositionProvider>>,
}

impl CallbackLocationSource {
    pub fn new(provider: Arc<dyn PositionProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// A source for a platform that has no geolocation capability.
    pub fn unsupported() -> Self {
        Self { provider: None }
    }
}

#[async_trait]
impl LocationSource for CallbackLocationSource {
    async fn acquire(&self) -> Result<Location, GeolocationError> {
        let Some(provider) = &self.provider else {
            return Err(GeolocationError::Unsupported);
        };

        let (tx, rx) = oneshot::channel::<Result<Location, GeolocationError>>();
        // Shared so whichever callback fires first consumes the sender.
        let tx = Arc::new(Mutex::new(Some(tx)));
        let success_tx = Arc::clone(&tx);
        let error_tx = tx;

        provider.get_current_position(
            Box::new(move |lat, lon| {
                let result = Location::new(lat, lon).ok_or(GeolocationError::PositionUnavailable);
                if let Some(tx) = success_tx.lock().ok().and_then(|mut slot| slot.take()) {
                    let _ = tx.send(result);
                }
            }),
            Box::new(move |err| {
                if let Some(tx) = error_tx.lock().ok().and_then(|mut slot| slot.take()) {
                    let _ = tx.send(Err(err));
                }
            }),
        );

        match rx.await {
            Ok(Ok(location)) => {
                debug!(lat = location.lat, lon = location.lon, "location: position acquired");
                Ok(location)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "location: position request failed");
                Err(err)
            }
            Err(_) => {
                warn!("location: provider dropped both callbacks");
                Err(GeolocationError::PositionUnavailable)
            }
        }
    }
}

/// Yields a preconfigured location, or `Unsupported` when none is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocationSource {
    location: Option<Location>,
}

impl FixedLocationSource {
    pub fn new(location: Option<Location>) -> Self {
        Self { location }
    }
}

#[async_trait]
impl LocationSource for FixedLocationSource {
    async fn acquire(&self) -> Result<Location, GeolocationError> {
        self.location.ok_or(GeolocationError::Unsupported)
    }
}

#[cfg(test)]
#[path = "tests/location_tests.rs"]
mod tests;
