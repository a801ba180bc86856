use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error payload of a non-2xx response. Backends disagree on where the human
/// readable text lives, so every known location is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ApiErrorBody {
    pub fn into_message(self) -> Option<String> {
        [self.message, self.detail, self.title]
            .into_iter()
            .flatten()
            .map(|text| text.trim().to_string())
            .find(|text| !text.is_empty())
    }
}

/// Best-effort extraction of the server's explanation from an error body.
pub fn parse_error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(ApiErrorBody::into_message)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServerRejection {
    pub status: u16,
    pub message: String,
}

impl ServerRejection {
    /// Uses the server's own message when present, otherwise `fallback` with
    /// the status code appended.
    pub fn from_body(status: u16, body: &[u8], fallback: &str) -> Self {
        let message = parse_error_message(body)
            .unwrap_or_else(|| format!("{fallback} (HTTP {status})"));
        Self { status, message }
    }
}
