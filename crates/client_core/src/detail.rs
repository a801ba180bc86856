//! Detail/edit state machine for a single employee.

use std::fmt;

use shared::domain::{EmployeeId, EmployeeWithDetails};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    api::{ApiFailure, EmployeeApi, FileUpload},
    edit::{EditBuffer, EmployeeField},
};

pub const DELETE_CONFIRMATION_PROMPT: &str = "Delete this employee? This cannot be undone.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailMode {
    View {
        record: EmployeeWithDetails,
    },
    Edit {
        record: EmployeeWithDetails,
        buffer: EditBuffer,
    },
    Add {
        buffer: EditBuffer,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    View,
    Edit,
    Add,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Add => "add",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Stay,
    Close {
        refresh: bool,
        notice: Option<String>,
    },
}

impl DetailOutcome {
    fn closed_with_refresh(notice: impl Into<String>) -> Self {
        Self::Close {
            refresh: true,
            notice: Some(notice.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum DetailError {
    #[error("required fields are missing: {}", join_fields(.0))]
    MissingRequired(Vec<EmployeeField>),
    #[error("cannot {action} in {mode} mode")]
    NotAvailable { action: &'static str, mode: ModeKind },
    #[error("{context}: {source}")]
    Request {
        context: &'static str,
        #[source]
        source: ApiFailure,
    },
}

fn join_fields(fields: &[EmployeeField]) -> String {
    fields
        .iter()
        .map(|field| field.wire_name())
        .collect::<Vec<_>>()
        .join(", ")
}

pub struct DetailController {
    mode: DetailMode,
}

impl DetailController {
    pub fn view(record: EmployeeWithDetails) -> Self {
        Self {
            mode: DetailMode::View { record },
        }
    }

    pub fn add() -> Self {
        Self {
            mode: DetailMode::Add {
                buffer: EditBuffer::blank(),
            },
        }
    }

    pub fn mode(&self) -> &DetailMode {
        &self.mode
    }

    pub fn kind(&self) -> ModeKind {
        match self.mode {
            DetailMode::View { .. } => ModeKind::View,
            DetailMode::Edit { .. } => ModeKind::Edit,
            DetailMode::Add { .. } => ModeKind::Add,
        }
    }

    /// Id of the backing record; `None` while adding.
    pub fn employee_id(&self) -> Option<EmployeeId> {
        match &self.mode {
            DetailMode::View { record } | DetailMode::Edit { record, .. } => Some(record.id()),
            DetailMode::Add { .. } => None,
        }
    }

    /// What should be rendered: the buffer while editing or adding, the
    /// fetched record otherwise.
    pub fn displayed(&self) -> &EmployeeWithDetails {
        match &self.mode {
            DetailMode::View { record } => record,
            DetailMode::Edit { buffer, .. } | DetailMode::Add { buffer } => buffer.draft(),
        }
    }

    pub fn buffer(&self) -> Option<&EditBuffer> {
        match &self.mode {
            DetailMode::View { .. } => None,
            DetailMode::Edit { buffer, .. } | DetailMode::Add { buffer } => Some(buffer),
        }
    }

    fn not_available(&self, action: &'static str) -> DetailError {
        DetailError::NotAvailable {
            action,
            mode: self.kind(),
        }
    }

    pub fn begin_edit(&mut self) -> Result<(), DetailError> {
        let DetailMode::View { record } = &self.mode else {
            return Err(self.not_available("edit"));
        };
        let buffer = EditBuffer::from_record(record);
        let record = record.clone();
        self.mode = DetailMode::Edit { record, buffer };
        Ok(())
    }

    /// Edit falls back to the untouched record; add and view close.
    pub fn cancel(&mut self) -> DetailOutcome {
        match &self.mode {
            DetailMode::Edit { record, .. } => {
                self.mode = DetailMode::View {
                    record: record.clone(),
                };
                DetailOutcome::Stay
            }
            DetailMode::Add { .. } | DetailMode::View { .. } => DetailOutcome::Close {
                refresh: false,
                notice: None,
            },
        }
    }

    pub fn set_field(
        &mut self,
        field: EmployeeField,
        value: impl Into<String>,
    ) -> Result<(), DetailError> {
        let kind = self.kind();
        match &mut self.mode {
            DetailMode::Edit { buffer, .. } | DetailMode::Add { buffer } => {
                buffer.set(field, value);
                Ok(())
            }
            DetailMode::View { .. } => Err(DetailError::NotAvailable {
                action: "change fields",
                mode: kind,
            }),
        }
    }

    pub async fn save(&mut self, api: &dyn EmployeeApi) -> Result<DetailOutcome, DetailError> {
        let (target, buffer) = match &self.mode {
            DetailMode::Edit { record, buffer } => (Some(record.id()), buffer),
            DetailMode::Add { buffer } => (None, buffer),
            DetailMode::View { .. } => return Err(self.not_available("save")),
        };

        let missing = buffer.missing_required();
        if !missing.is_empty() {
            warn!(missing = %join_fields(&missing), "save rejected: required fields missing");
            return Err(DetailError::MissingRequired(missing));
        }

        let request = buffer.to_request();
        match target {
            Some(id) => {
                api.update_employee(id, &request)
                    .await
                    .map_err(|source| DetailError::Request {
                        context: "failed to update employee",
                        source,
                    })?;
                info!(employee_id = id.0, "employee updated");
                Ok(DetailOutcome::closed_with_refresh("employee updated"))
            }
            None => {
                let response = api.create_employee(&request).await.map_err(|source| {
                    DetailError::Request {
                        context: "failed to create employee",
                        source,
                    }
                })?;
                info!(employee_id = ?response.employee_id, "employee created");
                Ok(DetailOutcome::closed_with_refresh("employee created"))
            }
        }
    }

    /// Asks `confirm` first; a declined confirmation issues no request.
    pub async fn delete<F>(
        &mut self,
        api: &dyn EmployeeApi,
        confirm: F,
    ) -> Result<DetailOutcome, DetailError>
    where
        F: FnOnce(&str) -> bool,
    {
        let DetailMode::View { record } = &self.mode else {
            return Err(self.not_available("delete"));
        };
        let id = record.id();
        if !confirm(DELETE_CONFIRMATION_PROMPT) {
            info!(employee_id = id.0, "delete declined");
            return Ok(DetailOutcome::Stay);
        }

        api.delete_employee(id)
            .await
            .map_err(|source| DetailError::Request {
                context: "failed to delete employee",
                source,
            })?;
        info!(employee_id = id.0, "employee deleted");
        Ok(DetailOutcome::closed_with_refresh("employee deleted"))
    }

    pub async fn replace_photo(
        &mut self,
        api: &dyn EmployeeApi,
        photo: FileUpload,
    ) -> Result<DetailOutcome, DetailError> {
        let DetailMode::View { record } = &self.mode else {
            return Err(self.not_available("replace the photo"));
        };
        let id = record.id();
        let response = api
            .upload_photo(id, photo)
            .await
            .map_err(|source| DetailError::Request {
                context: "failed to upload photo",
                source,
            })?;
        info!(employee_id = id.0, photo_url = ?response.photo_url, "photo uploaded");
        Ok(DetailOutcome::closed_with_refresh("photo uploaded"))
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
