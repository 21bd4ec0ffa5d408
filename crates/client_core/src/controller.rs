//! Session synchronization: geolocation, the two location-dependent reads,
//! and the submission-triggered refresh cycle.

use std::sync::Arc;

use futures::future::join_all;
use shared::domain::{DisasterType, Location, RedZone, Report};
use tokio::{
    sync::{broadcast, oneshot, Mutex},
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, info, warn};

use crate::{
    draft::{Draft, ImageUpload, NewReport},
    error::{ClientError, GeolocationError, RepositoryError},
    location::LocationSource,
    reporting::{ErrorReporter, LastErrorWins, TaggedError},
    repository::{DisasterTypeCatalog, RedZoneRepository, ReportRepository},
};

const EVENT_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct SessionDependencies {
    pub location: Arc<dyn LocationSource>,
    pub catalog: Arc<dyn DisasterTypeCatalog>,
    pub reports: Arc<dyn ReportRepository>,
    pub red_zones: Arc<dyn RedZoneRepository>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Init,
    AwaitingLocation,
    /// Terminal for the session.
    LocationError,
    Ready,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub location: Option<Location>,
    pub reports: Vec<Report>,
    pub red_zones: Vec<RedZone>,
    pub disaster_types: Vec<DisasterType>,
    pub draft: Draft,
    pub last_error: Option<String>,
    pub submitting: bool,
}

impl SessionState {
    pub fn can_submit(&self) -> bool {
        self.phase == SessionPhase::Ready && !self.submitting && self.draft.is_complete()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseChanged(SessionPhase),
    DisasterTypesUpdated,
    ReportsUpdated,
    RedZonesUpdated,
    DraftChanged,
    ErrorReported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    Failed,
    /// Nothing was sent: no location, incomplete draft, or a submission in flight.
    NotReady,
    /// The session was shut down while the request was in flight.
    Cancelled,
}

struct ControllerInner {
    state: SessionState,
    reporter: Box<dyn ErrorReporter>,
    cancelled: bool,
}

impl ControllerInner {
    fn record_error(&mut self, error: ClientError) -> SessionEvent {
        self.reporter.report(&error);
        let message = self
            .reporter
            .latest()
            .map_or_else(|| error.user_message(), str::to_string);
        self.state.last_error = Some(message.clone());
        SessionEvent::ErrorReported(message)
    }

    fn begin_session(&mut self) -> bool {
        if self.cancelled || self.state.phase != SessionPhase::Init {
            return false;
        }
        self.state.phase = SessionPhase::AwaitingLocation;
        true
    }

    fn apply_disaster_types(&mut self, types: Vec<DisasterType>) {
        self.state.disaster_types = types;
    }

    fn apply_location(&mut self, location: Location) {
        self.state.location = Some(location);
        self.state.draft.location = Some(location);
        self.state.phase = SessionPhase::Ready;
    }

    fn apply_location_error(&mut self, error: GeolocationError) -> SessionEvent {
        self.state.phase = SessionPhase::LocationError;
        self.record_error(error.into())
    }

    fn apply_reports(&mut self, reports: Vec<Report>) {
        self.state.reports = reports;
    }

    fn apply_red_zones(&mut self, red_zones: Vec<RedZone>) {
        self.state.red_zones = red_zones;
    }

    fn submission_succeeded(&mut self) -> Option<Location> {
        self.state.submitting = false;
        self.state.draft.clear();
        self.state.location
    }

    fn submission_failed(&mut self, error: RepositoryError) -> SessionEvent {
        self.state.submitting = false;
        self.record_error(error.into())
    }
}

/// Owns the session state; views read snapshots and subscribe to events.
pub struct SyncController {
    deps: SessionDependencies,
    inner: Mutex<ControllerInner>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Every tracked task, including those `wait_idle` is currently joining.
    aborts: Mutex<Vec<AbortHandle>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SyncController {
    pub fn new(deps: SessionDependencies) -> Arc<Self> {
        Self::with_reporter(deps, Box::new(LastErrorWins::default()))
    }

    pub fn with_reporter(deps: SessionDependencies, reporter: Box<dyn ErrorReporter>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            deps,
            inner: Mutex::new(ControllerInner {
                state: SessionState::default(),
                reporter,
                cancelled: false,
            }),
            tasks: Mutex::new(Vec::new()),
            aborts: Mutex::new(Vec::new()),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    /// Failures retained by the reporter, oldest first.
    pub async fn error_log(&self) -> Vec<TaggedError> {
        self.inner.lock().await.reporter.log()
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    async fn spawn_tracked<F>(&self, task: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        {
            let mut aborts = self.aborts.lock().await;
            aborts.retain(|abort| !abort.is_finished());
            aborts.push(handle.abort_handle());
        }
        let mut tasks = self.tasks.lock().await;
        tasks.retain(|handle| !handle.is_finished());
        tasks.push(handle);
    }

    /// Starts the catalog fetch and location acquisition concurrently.
    /// Returns `false` if the session was already started or shut down.
    pub async fn start(self: &Arc<Self>) -> bool {
        if !self.inner.lock().await.begin_session() {
            return false;
        }
        info!("session: started, awaiting location");
        self.emit(SessionEvent::PhaseChanged(SessionPhase::AwaitingLocation));

        let controller = Arc::clone(self);
        self.spawn_tracked(async move { controller.load_disaster_types().await })
            .await;
        let controller = Arc::clone(self);
        self.spawn_tracked(async move { controller.acquire_location().await })
            .await;
        true
    }

    async fn load_disaster_types(self: Arc<Self>) {
        let result = self.deps.catalog.fetch_types().await;
        let mut inner = self.inner.lock().await;
        if inner.cancelled {
            return;
        }
        let event = match result {
            Ok(types) => {
                info!(count = types.len(), "session: disaster types loaded");
                inner.apply_disaster_types(types);
                SessionEvent::DisasterTypesUpdated
            }
            Err(err) => {
                warn!(error = %err, "session: disaster type fetch failed");
                inner.record_error(err.into())
            }
        };
        drop(inner);
        self.emit(event);
    }

    async fn acquire_location(self: Arc<Self>) {
        let result = self.deps.location.acquire().await;
        let mut inner = self.inner.lock().await;
        if inner.cancelled {
            return;
        }
        match result {
            Ok(location) => {
                info!(lat = location.lat, lon = location.lon, "session: location acquired");
                inner.apply_location(location);
                drop(inner);
                self.emit(SessionEvent::PhaseChanged(SessionPhase::Ready));
                self.refresh(location).await;
            }
            Err(err) => {
                warn!(error = %err, "session: location unavailable, no nearby data will load");
                let event = inner.apply_location_error(err);
                drop(inner);
                self.emit(SessionEvent::PhaseChanged(SessionPhase::LocationError));
                self.emit(event);
            }
        }
    }

    /// Fans out both location-dependent reads; neither waits for the other.
    async fn refresh(self: &Arc<Self>, location: Location) {
        let controller = Arc::clone(self);
        self.spawn_tracked(async move { controller.load_reports(location).await })
            .await;
        let controller = Arc::clone(self);
        self.spawn_tracked(async move { controller.load_red_zones(location).await })
            .await;
    }

    async fn load_reports(self: Arc<Self>, location: Location) {
        let result = self.deps.reports.fetch_near(location).await;
        let mut inner = self.inner.lock().await;
        if inner.cancelled {
            debug!("session: dropping report results after shutdown");
            return;
        }
        let event = match result {
            Ok(reports) => {
                info!(count = reports.len(), "session: reports replaced");
                inner.apply_reports(reports);
                SessionEvent::ReportsUpdated
            }
            Err(err) => {
                warn!(error = %err, "session: report fetch failed");
                inner.record_error(err.into())
            }
        };
        drop(inner);
        self.emit(event);
    }

    async fn load_red_zones(self: Arc<Self>, location: Location) {
        let result = self.deps.red_zones.fetch_near(location).await;
        let mut inner = self.inner.lock().await;
        if inner.cancelled {
            debug!("session: dropping red zone results after shutdown");
            return;
        }
        let event = match result {
            Ok(red_zones) => {
                info!(count = red_zones.len(), "session: red zones replaced");
                inner.apply_red_zones(red_zones);
                SessionEvent::RedZonesUpdated
            }
            Err(err) => {
                warn!(error = %err, "session: red zone fetch failed");
                inner.record_error(err.into())
            }
        };
        drop(inner);
        self.emit(event);
    }

    /// Selects a category; only values from the loaded catalog are accepted.
    pub async fn set_disaster_type(&self, disaster_type: Option<DisasterType>) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.cancelled {
            return false;
        }
        if let Some(kind) = &disaster_type {
            if !inner.state.disaster_types.contains(kind) {
                return false;
            }
        }
        inner.state.draft.disaster_type = disaster_type;
        drop(inner);
        self.emit(SessionEvent::DraftChanged);
        true
    }

    pub async fn set_description(&self, description: impl Into<String>) -> bool {
        self.edit_draft(|draft| draft.description = description.into())
            .await
    }

    pub async fn set_image(&self, image: ImageUpload) -> bool {
        self.edit_draft(|draft| draft.image = Some(image)).await
    }

    pub async fn clear_image(&self) -> bool {
        self.edit_draft(|draft| draft.image = None).await
    }

    async fn edit_draft(&self, edit: impl FnOnce(&mut Draft)) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.cancelled {
            return false;
        }
        edit(&mut inner.state.draft);
        drop(inner);
        self.emit(SessionEvent::DraftChanged);
        true
    }

    /// Posts the draft. On success the draft is cleared and both lists are
    /// re-fetched; on failure the draft is kept for another attempt.
    ///
    /// The request settles on a tracked task. Dropping the returned future
    /// does not abandon it.
    pub async fn submit(self: &Arc<Self>) -> SubmitOutcome {
        let report = {
            let mut inner = self.inner.lock().await;
            if inner.cancelled || !inner.state.can_submit() {
                return SubmitOutcome::NotReady;
            }
            let Some(report) = inner.state.draft.to_new_report() else {
                return SubmitOutcome::NotReady;
            };
            inner.state.submitting = true;
            report
        };

        info!(disaster_type = %report.disaster_type, "session: submitting report");
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let controller = Arc::clone(self);
        self.spawn_tracked(async move {
            let outcome = controller.settle_submission(report).await;
            let _ = outcome_tx.send(outcome);
        })
        .await;
        // The sender only drops unsent when shutdown aborts the task.
        outcome_rx.await.unwrap_or(SubmitOutcome::Cancelled)
    }

    async fn settle_submission(self: Arc<Self>, report: NewReport) -> SubmitOutcome {
        let result = self.deps.reports.submit(&report).await;

        let mut inner = self.inner.lock().await;
        if inner.cancelled {
            return SubmitOutcome::Cancelled;
        }
        match result {
            Ok(()) => {
                let location = inner.submission_succeeded();
                drop(inner);
                info!("session: report created, refreshing nearby data");
                self.emit(SessionEvent::DraftChanged);
                if let Some(location) = location {
                    self.refresh(location).await;
                }
                SubmitOutcome::Submitted
            }
            Err(err) => {
                warn!(error = %err, "session: report submission failed, draft kept");
                let event = inner.submission_failed(err);
                drop(inner);
                self.emit(event);
                SubmitOutcome::Failed
            }
        }
    }

    /// Waits for every background task spawned so far, including tasks
    /// spawned by them.
    pub async fn wait_idle(&self) {
        loop {
            let pending = std::mem::take(&mut *self.tasks.lock().await);
            if pending.is_empty() {
                return;
            }
            for result in join_all(pending).await {
                if let Err(err) = result {
                    if !err.is_cancelled() {
                        warn!(error = %err, "session: background task failed");
                    }
                }
            }
        }
    }

    /// Cancels the session scope: in-flight work is aborted and nothing
    /// settles into state afterwards.
    pub async fn shutdown(&self) {
        {
            let mut inner = self.inner.lock().await;
            if inner.cancelled {
                return;
            }
            inner.cancelled = true;
        }
        let aborts = std::mem::take(&mut *self.aborts.lock().await);
        for abort in &aborts {
            abort.abort();
        }
        info!(aborted = aborts.len(), "session: shut down");
    }

    pub async fn is_shut_down(&self) -> bool {
        self.inner.lock().await.cancelled
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
