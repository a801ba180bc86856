//! Directory controller: the employee collection, search, import/export and
//! the lifecycle of the detail modal.

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use shared::domain::{EmployeeId, EmployeeSummary};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::{
    api::{ApiFailure, EmployeeApi, FileUpload},
    detail::{DetailController, DetailError, DetailOutcome, ModeKind},
    edit::EmployeeField,
    events::{Action, ActionError, DirectoryEvent, ErrorCategory},
};

const EVENT_CAPACITY: usize = 256;

/// Shared boolean that is lowered again when the guard returned by
/// [`BusyFlag::raise`] is dropped, including when the owning future is
/// cancelled mid-request.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn raise(&self) -> BusyGuard {
        self.0.store(true, Ordering::SeqCst);
        BusyGuard(Arc::clone(&self.0))
    }

    /// `None` when the flag is already raised.
    pub fn try_raise(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }
}

#[must_use = "the flag is lowered as soon as the guard is dropped"]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Destination for downloaded artifacts.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf>;
}

pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}

pub fn export_filename(date: NaiveDate) -> String {
    format!("employees_{}.csv", date.format("%Y-%m-%d"))
}

pub struct DirectoryController {
    api: Arc<dyn EmployeeApi>,
    employees: Vec<EmployeeSummary>,
    keyword: String,
    loading: BusyFlag,
    exporting: BusyFlag,
    error: Option<String>,
    modal: Option<DetailController>,
    events: broadcast::Sender<DirectoryEvent>,
}

impl DirectoryController {
    pub fn new(api: Arc<dyn EmployeeApi>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            employees: Vec::new(),
            keyword: String::new(),
            loading: BusyFlag::default(),
            exporting: BusyFlag::default(),
            error: None,
            modal: None,
            events,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DirectoryEvent> {
        self.events.subscribe()
    }

    pub fn api_url(&self) -> &str {
        self.api.api_url()
    }

    pub fn employees(&self) -> &[EmployeeSummary] {
        &self.employees
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_raised()
    }

    pub fn loading_flag(&self) -> BusyFlag {
        self.loading.clone()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.is_raised()
    }

    pub fn exporting_flag(&self) -> BusyFlag {
        self.exporting.clone()
    }

    pub fn modal(&self) -> Option<&DetailController> {
        self.modal.as_ref()
    }

    fn emit(&self, event: DirectoryEvent) {
        let _ = self.events.send(event);
    }

    fn emit_error(&self, error: ActionError) {
        warn!(action = ?error.action(), category = ?error.category(), message = error.message(), "directory action failed");
        self.emit(DirectoryEvent::Error(error));
    }

    fn replace_collection(&mut self, action: Action, result: Result<Vec<EmployeeSummary>, ApiFailure>) {
        match result {
            Ok(employees) => {
                info!(count = employees.len(), "employee collection replaced");
                self.employees = employees;
                self.error = None;
                self.emit(DirectoryEvent::CollectionReplaced {
                    count: self.employees.len(),
                });
            }
            Err(failure) => {
                let error = ActionError::from_api(action, &failure);
                self.error = Some(error.message().to_string());
                self.emit_error(error);
            }
        }
    }

    pub async fn load_all(&mut self) {
        let result = {
            let _loading = self.loading.raise();
            self.api.list_employees().await
        };
        self.replace_collection(Action::LoadAll, result);
    }

    pub async fn search(&mut self, keyword: &str) {
        self.keyword = keyword.to_string();
        let result = {
            let _loading = self.loading.raise();
            self.api.search_employees(keyword).await
        };
        self.replace_collection(Action::Search, result);
    }

    pub async fn open_detail(&mut self, id: EmployeeId) {
        match self.api.get_employee(id).await {
            Ok(record) => {
                info!(employee_id = id.0, "opening employee detail");
                self.modal = Some(DetailController::view(record));
                self.emit(DirectoryEvent::ModalOpened {
                    mode: ModeKind::View,
                    employee_id: Some(id),
                });
            }
            Err(failure) => self.emit_error(ActionError::from_api(Action::OpenDetail, &failure)),
        }
    }

    pub fn open_add(&mut self) {
        let modal = DetailController::add();
        let mode = modal.kind();
        self.modal = Some(modal);
        self.emit(DirectoryEvent::ModalOpened {
            mode,
            employee_id: None,
        });
    }

    pub fn close_modal(&mut self) {
        if self.modal.take().is_some() {
            self.emit(DirectoryEvent::ModalClosed);
        }
    }

    fn no_modal(action: Action) -> ActionError {
        ActionError::new(action, ErrorCategory::Validation, "no employee is open")
    }

    pub fn begin_edit(&mut self) {
        let Some(modal) = self.modal.as_mut() else {
            return self.emit_error(Self::no_modal(Action::Edit));
        };
        match modal.begin_edit() {
            Ok(()) => {
                let kind = modal.kind();
                self.emit(DirectoryEvent::ModalModeChanged(kind));
            }
            Err(err) => self.emit_error(ActionError::from_detail(Action::Edit, &err)),
        }
    }

    pub fn set_field(&mut self, field: EmployeeField, value: impl Into<String>) {
        let Some(modal) = self.modal.as_mut() else {
            return self.emit_error(Self::no_modal(Action::Edit));
        };
        if let Err(err) = modal.set_field(field, value) {
            self.emit_error(ActionError::from_detail(Action::Edit, &err));
        }
    }

    pub async fn cancel_edit(&mut self) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };
        let outcome = modal.cancel();
        if outcome == DetailOutcome::Stay {
            let kind = modal.kind();
            self.emit(DirectoryEvent::ModalModeChanged(kind));
        }
        self.apply_outcome(Action::Edit, Ok(outcome)).await;
    }

    pub async fn save(&mut self) {
        let Some(modal) = self.modal.as_mut() else {
            return self.emit_error(Self::no_modal(Action::Save));
        };
        let result = modal.save(self.api.as_ref()).await;
        self.apply_outcome(Action::Save, result).await;
    }

    pub async fn delete<F>(&mut self, confirm: F)
    where
        F: FnOnce(&str) -> bool,
    {
        let Some(modal) = self.modal.as_mut() else {
            return self.emit_error(Self::no_modal(Action::Delete));
        };
        let result = modal.delete(self.api.as_ref(), confirm).await;
        self.apply_outcome(Action::Delete, result).await;
    }

    pub async fn replace_photo(&mut self, photo: FileUpload) {
        let Some(modal) = self.modal.as_mut() else {
            return self.emit_error(Self::no_modal(Action::UploadPhoto));
        };
        let result = modal.replace_photo(self.api.as_ref(), photo).await;
        self.apply_outcome(Action::UploadPhoto, result).await;
    }

    async fn apply_outcome(&mut self, action: Action, result: Result<DetailOutcome, DetailError>) {
        match result {
            Ok(DetailOutcome::Stay) => {}
            Ok(DetailOutcome::Close { refresh, notice }) => {
                self.close_modal();
                if let Some(notice) = notice {
                    self.emit(DirectoryEvent::Notice(notice));
                }
                if refresh {
                    self.load_all().await;
                }
            }
            Err(err) => self.emit_error(ActionError::from_detail(action, &err)),
        }
    }

    /// Uploads a CSV file. Any completed import, including one with rejected
    /// rows, is followed by a reload; a rejected upload is not.
    pub async fn import_csv(&mut self, file: FileUpload) {
        let filename = file.filename.clone();
        match self.api.import_csv(file).await {
            Ok(summary) => {
                info!(
                    %filename,
                    success_count = summary.success_count,
                    failure_count = summary.failure_count,
                    "csv import finished"
                );
                self.emit(DirectoryEvent::Notice(format!(
                    "import finished: {} succeeded, {} failed",
                    summary.success_count, summary.failure_count
                )));
                self.emit(DirectoryEvent::ImportFinished(summary));
                self.load_all().await;
            }
            Err(failure) => {
                error!(%filename, error = %failure, "csv import failed");
                self.emit_error(ActionError::from_api(Action::Import, &failure));
            }
        }
    }

    pub async fn export_csv(&mut self, sink: &dyn ArtifactSink) {
        let Some(_exporting) = self.exporting.try_raise() else {
            return self.emit_error(ActionError::new(
                Action::Export,
                ErrorCategory::Validation,
                "an export is already in progress",
            ));
        };

        let bytes = match self.api.export_csv().await {
            Ok(bytes) => bytes,
            Err(failure) => return self.emit_error(ActionError::from_api(Action::Export, &failure)),
        };

        let filename = export_filename(Local::now().date_naive());
        match sink.save(&filename, &bytes).await {
            Ok(path) => {
                info!(path = %path.display(), size_bytes = bytes.len(), "export saved");
                self.emit(DirectoryEvent::Notice(format!("export saved to {}", path.display())));
                self.emit(DirectoryEvent::ExportSaved { path });
            }
            Err(err) => self.emit_error(ActionError::new(
                Action::Export,
                ErrorCategory::Io,
                format!("failed to save {filename}: {err}"),
            )),
        }
    }
}

#[cfg(test)]
#[path = "tests/directory_tests.rs"]
mod tests;
