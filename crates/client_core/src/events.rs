//! Events emitted by the directory controller and error modeling for them.

use std::path::PathBuf;

use shared::{domain::EmployeeId, protocol::ImportResponse};

use crate::{api::ApiFailure, detail::DetailError, detail::ModeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEvent {
    CollectionReplaced { count: usize },
    ModalOpened {
        mode: ModeKind,
        employee_id: Option<EmployeeId>,
    },
    ModalModeChanged(ModeKind),
    ModalClosed,
    Notice(String),
    ImportFinished(ImportResponse),
    ExportSaved { path: PathBuf },
    Error(ActionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Server,
    Validation,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoadAll,
    Search,
    OpenDetail,
    Edit,
    Save,
    Delete,
    UploadPhoto,
    Import,
    Export,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionError {
    category: ErrorCategory,
    action: Action,
    message: String,
}

impl ActionError {
    pub fn new(action: Action, category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            action,
            message: message.into(),
        }
    }

    pub fn from_api(action: Action, failure: &ApiFailure) -> Self {
        let category = match failure {
            ApiFailure::Transport(_) => ErrorCategory::Transport,
            ApiFailure::Rejected(_) | ApiFailure::Decode(_) => ErrorCategory::Server,
            ApiFailure::Io { .. } => ErrorCategory::Io,
        };
        Self::new(action, category, failure.to_string())
    }

    pub fn from_detail(action: Action, error: &DetailError) -> Self {
        match error {
            DetailError::Request { source, .. } => {
                Self::new(action, Self::from_api(action, source).category, error.to_string())
            }
            DetailError::MissingRequired(_) | DetailError::NotAvailable { .. } => {
                Self::new(action, ErrorCategory::Validation, error.to_string())
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
