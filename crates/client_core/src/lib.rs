pub mod controller;
pub mod draft;
pub mod error;
pub mod location;
pub mod reporting;
pub mod repository;
pub mod views;

pub use controller::{
    SessionDependencies, SessionEvent, SessionPhase, SessionState, SubmitOutcome, SyncController,
};
pub use draft::{Draft, ImageUpload, NewReport};
pub use error::{ClientError, GeolocationError, Operation, RepositoryError};
pub use location::{CallbackLocationSource, FixedLocationSource, LocationSource, PositionProvider};
pub use reporting::{ErrorHistory, ErrorReporter, LastErrorWins, TaggedError};
pub use repository::{
    DisasterTypeCatalog, HttpApi, HttpSetupError, RedZoneRepository, ReportRepository,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use views::{MapView, RedZoneView, ReportFormView, ReportListView};
