pub mod api;
pub mod config;
pub mod detail;
pub mod directory;
pub mod edit;
pub mod events;

pub use api::{photo_location, ApiFailure, EmployeeApi, FileUpload, HttpEmployeeApi};
pub use config::{load_settings, Settings, SettingsError};
pub use detail::{DetailController, DetailError, DetailMode, DetailOutcome, ModeKind};
pub use directory::{
    export_filename, ArtifactSink, BusyFlag, BusyGuard, DirectoryController, DirectorySink,
};
pub use edit::{EditBuffer, EmployeeField, UnknownField};
pub use events::{Action, ActionError, DirectoryEvent, ErrorCategory};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
