use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};

enum Outcome {
    Position(f64, f64),
    Fail(GeolocationError),
    Silent,
}

struct ScriptedProvider {
    outcome: Outcome,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
        })
    }
}

impl PositionProvider for ScriptedProvider {
    fn get_current_position(&self, on_success: PositionCallback, on_error: PositionErrorCallback) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Position(lat, lon) => {
                // Deliver from another task, the way a device callback would.
                tokio::spawn(async move { on_success(lat, lon) });
            }
            Outcome::Fail(err) => on_error(err),
            Outcome::Silent => {}
        }
    }
}

#[tokio::test]
async fn callback_success_resolves_to_location() {
    let provider = ScriptedProvider::new(Outcome::Position(40.0, -75.0));
    let source = CallbackLocationSource::new(provider.clone());

    let location = source.acquire().await.expect("location");

    assert_eq!(location, Location { lat: 40.0, lon: -75.0 });
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn callback_error_is_passed_through_without_retry() {
    let provider = ScriptedProvider::new(Outcome::Fail(GeolocationError::PermissionDenied));
    let source = CallbackLocationSource::new(provider.clone());

    let err = source.acquire().await.expect_err("denied");

    assert_eq!(err, GeolocationError::PermissionDenied);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn out_of_range_position_is_unavailable() {
    let provider = ScriptedProvider::new(Outcome::Position(91.0, 0.0));
    let source = CallbackLocationSource::new(provider);

    assert_eq!(
        source.acquire().await,
        Err(GeolocationError::PositionUnavailable)
    );
}

#[tokio::test]
async fn provider_dropping_callbacks_is_unavailable() {
    let source = CallbackLocationSource::new(ScriptedProvider::new(Outcome::Silent));
    assert_eq!(
        source.acquire().await,
        Err(GeolocationError::PositionUnavailable)
    );
}

#[tokio::test]
async fn missing_capability_is_unsupported() {
    assert_eq!(
        CallbackLocationSource::unsupported().acquire().await,
        Err(GeolocationError::Unsupported)
    );
    assert_eq!(
        FixedLocationSource::new(None).acquire().await,
        Err(GeolocationError::Unsupported)
    );
}
