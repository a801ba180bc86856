//! REST surface of the employee backend.

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{EmployeeId, EmployeeSummary, EmployeeWithDetails},
    error::ServerRejection,
    protocol::{ApiResponse, ImportResponse, PhotoUploadResponse, SearchQuery, UpdateEmployeeRequest},
};
use thiserror::Error;
use tracing::{debug, warn};

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum ApiFailure {
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error(transparent)]
    Rejected(#[from] ServerRejection),
    #[error("unexpected response from server: {0}")]
    Decode(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for ApiFailure {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

/// A file picked by the user, ready to be sent as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ApiFailure> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiFailure::Io {
            path: path.display().to_string(),
            source,
        })?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let mime_type = mime_guess::from_path(path).first_raw().map(str::to_string);
        Ok(Self {
            filename,
            mime_type,
            bytes,
        })
    }

    pub fn with_default_mime(mut self, mime_type: &str) -> Self {
        if self.mime_type.is_none() {
            self.mime_type = Some(mime_type.to_string());
        }
        self
    }

    fn into_part(self) -> Result<Part, ApiFailure> {
        let mime_type = self.mime_type.unwrap_or_else(|| OCTET_STREAM.to_string());
        Part::bytes(self.bytes)
            .file_name(self.filename)
            .mime_str(&mime_type)
            .map_err(ApiFailure::Transport)
    }
}

#[async_trait]
pub trait EmployeeApi: Send + Sync {
    fn api_url(&self) -> &str;
    async fn list_employees(&self) -> Result<Vec<EmployeeSummary>, ApiFailure>;
    async fn search_employees(&self, keyword: &str) -> Result<Vec<EmployeeSummary>, ApiFailure>;
    async fn get_employee(&self, id: EmployeeId) -> Result<EmployeeWithDetails, ApiFailure>;
    async fn create_employee(
        &self,
        request: &UpdateEmployeeRequest,
    ) -> Result<ApiResponse, ApiFailure>;
    async fn update_employee(
        &self,
        id: EmployeeId,
        request: &UpdateEmployeeRequest,
    ) -> Result<ApiResponse, ApiFailure>;
    async fn delete_employee(&self, id: EmployeeId) -> Result<ApiResponse, ApiFailure>;
    async fn upload_photo(
        &self,
        id: EmployeeId,
        photo: FileUpload,
    ) -> Result<PhotoUploadResponse, ApiFailure>;
    async fn import_csv(&self, file: FileUpload) -> Result<ImportResponse, ApiFailure>;
    async fn export_csv(&self) -> Result<Vec<u8>, ApiFailure>;
}

/// Where a stored photo can be fetched from. The server hands out paths
/// relative to its own root.
pub fn photo_location(api_url: &str, photo_url: &str) -> String {
    if photo_url.starts_with("http://") || photo_url.starts_with("https://") {
        return photo_url.to_string();
    }
    format!("{api_url}{photo_url}")
}

pub struct HttpEmployeeApi {
    http: Client,
    api_url: String,
}

impl HttpEmployeeApi {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
        }
    }

    pub fn with_timeout(api_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiFailure> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/employees{path}", self.api_url)
    }

    async fn checked(response: Response, fallback: &str) -> Result<Response, ApiFailure> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        let rejection = ServerRejection::from_body(status.as_u16(), &body, fallback);
        warn!(status = status.as_u16(), message = %rejection.message, "employee api request rejected");
        Err(rejection.into())
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiFailure> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ApiFailure::Decode(e.to_string()))
    }

    /// Confirmation bodies are informational only; an empty or unexpected body
    /// still counts as success.
    async fn decode_lenient<T: DeserializeOwned + Default>(response: Response) -> Result<T, ApiFailure> {
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_slice(&body).unwrap_or_else(|e| {
            debug!(error = %e, "ignoring undecodable confirmation body");
            T::default()
        }))
    }
}

#[async_trait]
impl EmployeeApi for HttpEmployeeApi {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn list_employees(&self) -> Result<Vec<EmployeeSummary>, ApiFailure> {
        let response = self.http.get(self.url("")).send().await?;
        let response = Self::checked(response, "failed to load employees").await?;
        Self::decode(response).await
    }

    async fn search_employees(&self, keyword: &str) -> Result<Vec<EmployeeSummary>, ApiFailure> {
        let response = self
            .http
            .get(self.url("/search"))
            .query(&SearchQuery { keyword })
            .send()
            .await?;
        let response = Self::checked(response, "search failed").await?;
        Self::decode(response).await
    }

    async fn get_employee(&self, id: EmployeeId) -> Result<EmployeeWithDetails, ApiFailure> {
        let response = self.http.get(self.url(&format!("/{id}"))).send().await?;
        let response = Self::checked(response, "failed to load employee details").await?;
        Self::decode(response).await
    }

    async fn create_employee(
        &self,
        request: &UpdateEmployeeRequest,
    ) -> Result<ApiResponse, ApiFailure> {
        let response = self.http.post(self.url("")).json(request).send().await?;
        let response = Self::checked(response, "failed to create employee").await?;
        Self::decode_lenient(response).await
    }

    async fn update_employee(
        &self,
        id: EmployeeId,
        request: &UpdateEmployeeRequest,
    ) -> Result<ApiResponse, ApiFailure> {
        let response = self
            .http
            .put(self.url(&format!("/{id}")))
            .json(request)
            .send()
            .await?;
        let response = Self::checked(response, "failed to update employee").await?;
        Self::decode_lenient(response).await
    }

    async fn delete_employee(&self, id: EmployeeId) -> Result<ApiResponse, ApiFailure> {
        let response = self.http.delete(self.url(&format!("/{id}"))).send().await?;
        let response = Self::checked(response, "failed to delete employee").await?;
        Self::decode_lenient(response).await
    }

    async fn upload_photo(
        &self,
        id: EmployeeId,
        photo: FileUpload,
    ) -> Result<PhotoUploadResponse, ApiFailure> {
        let form = Form::new().part("photo", photo.into_part()?);
        let response = self
            .http
            .post(self.url(&format!("/{id}/upload-photo")))
            .multipart(form)
            .send()
            .await?;
        let response = Self::checked(response, "failed to upload photo").await?;
        Self::decode_lenient(response).await
    }

    async fn import_csv(&self, file: FileUpload) -> Result<ImportResponse, ApiFailure> {
        let form = Form::new().part("file", file.into_part()?);
        let response = self
            .http
            .post(self.url("/import"))
            .multipart(form)
            .send()
            .await?;
        let response = Self::checked(response, "import failed").await?;
        Self::decode(response).await
    }

    async fn export_csv(&self) -> Result<Vec<u8>, ApiFailure> {
        let response = self.http.get(self.url("/export")).send().await?;
        let response = Self::checked(response, "export failed").await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
