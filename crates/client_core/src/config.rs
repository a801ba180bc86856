use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::warn;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:5182";
pub const DEFAULT_CONFIG_FILE: &str = "directory.toml";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid api url '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub export_dir: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            export_dir: PathBuf::from("."),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Overlays values from a flat TOML table. Unknown keys and malformed
    /// files are ignored with a warning.
    pub fn apply_file(&mut self, raw: &str) {
        let table = match raw.parse::<toml::Table>() {
            Ok(table) => table,
            Err(error) => {
                warn!(%error, "ignoring malformed settings file");
                return;
            }
        };

        if let Some(v) = table.get("api_url").and_then(toml::Value::as_str) {
            self.api_url = v.to_string();
        }
        if let Some(v) = table.get("export_dir").and_then(toml::Value::as_str) {
            self.export_dir = PathBuf::from(v);
        }
        match table.get("request_timeout_secs") {
            Some(toml::Value::Integer(v)) if *v > 0 => self.request_timeout_secs = *v as u64,
            Some(toml::Value::String(v)) => {
                if let Ok(parsed) = v.parse::<u64>() {
                    self.request_timeout_secs = parsed;
                }
            }
            _ => {}
        }
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("API_URL") {
            self.api_url = v;
        }
        if let Some(v) = lookup("APP__API_URL") {
            self.api_url = v;
        }
        if let Some(v) = lookup("APP__EXPORT_DIR") {
            self.export_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_secs = parsed;
            }
        }
    }
}

/// Defaults, then the settings file, then the process environment.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    if let Ok(raw) = fs::read_to_string(path) {
        settings.apply_file(&raw);
    } else if config_path.is_some() {
        warn!(path = %path.display(), "settings file not readable; using defaults");
    }

    settings.apply_env(|key| std::env::var(key).ok());
    settings.api_url = normalize_api_url(&settings.api_url)?;
    Ok(settings)
}

/// Trims whitespace and trailing slashes so paths can be appended directly.
pub fn normalize_api_url(raw: &str) -> Result<String, SettingsError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(DEFAULT_API_URL.to_string());
    }

    let parsed = Url::parse(trimmed).map_err(|e| SettingsError::InvalidApiUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SettingsError::InvalidApiUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
