//! HTTP adapter errors
//!
//! Setup problems surface as [`ConfigError`]. Request failures never leave
//! the adapter as reqwest errors; they are mapped onto `PortError`:
//! - connect/request failures -> `PortError::Connection`
//! - client timeout -> `PortError::Timeout`
//! - non-2xx -> `PortError::Status` with the server's message when it sent one
//! - unparseable body -> `PortError::Transformation`

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use core_kernel::{CoreError, PortError};

const MAX_BODY_IN_MESSAGE: usize = 200;

/// Errors raised while configuring the adapter
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Request timeout must be at least one second")]
    ZeroTimeout,

    #[error("Unknown addressing mode '{0}' (expected nested, flat or auto)")]
    UnknownAddressing(String),

    #[error("Could not read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl From<ConfigError> for CoreError {
    fn from(err: ConfigError) -> Self {
        CoreError::configuration(err.to_string())
    }
}

/// Maps a failed send or body read
pub(crate) fn transport_error(err: reqwest::Error, operation: &str, timeout: Duration) -> PortError {
    if err.is_timeout() {
        return PortError::Timeout {
            operation: operation.to_string(),
            duration_ms: timeout.as_millis() as u64,
        };
    }
    if err.is_decode() {
        return PortError::transformation(format!("{}: {}", operation, err));
    }
    PortError::Connection {
        message: format!("{} failed: {}", operation, err),
        source: Some(Box::new(err)),
    }
}

/// Maps a non-2xx answer, preferring the `error`/`message` field of a JSON body
pub(crate) fn status_error(status: StatusCode, body: &[u8]) -> PortError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|json| {
            ["error", "message"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| {
            let text = String::from_utf8_lossy(body);
            let text = text.trim();
            if text.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text.chars().take(MAX_BODY_IN_MESSAGE).collect()
            }
        });
    PortError::status(status.as_u16(), message)
}

/// Parses a JSON body; an empty body reads as `null`
pub(crate) fn parse_json(body: &[u8], operation: &str) -> Result<Value, PortError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|err| PortError::transformation(format!("{}: invalid JSON: {}", operation, err)))
}
