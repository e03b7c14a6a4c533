//! Claims API configuration
//!
//! Values come from `CLAIMS_API_*` environment variables, falling back to
//! defaults that match a locally running backend.

use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Default backend location
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Which route family addresses a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Addressing {
    /// `/api/claims/{id}/files/{fid}`
    Nested,
    /// `/api/files/{fid}`
    Flat,
    /// Nested first, flat when the server answers 404 or 405
    #[default]
    Auto,
}

impl FromStr for Addressing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nested" => Ok(Addressing::Nested),
            "flat" => Ok(Addressing::Flat),
            "auto" => Ok(Addressing::Auto),
            other => Err(ConfigError::UnknownAddressing(other.to_string())),
        }
    }
}

impl fmt::Display for Addressing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Addressing::Nested => "nested",
            Addressing::Flat => "flat",
            Addressing::Auto => "auto",
        })
    }
}

/// Claims API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClaimsApiConfig {
    /// Backend base URL, without the `/api` suffix
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// File route family
    pub addressing: Addressing,
    /// Log level for the binary
    pub log_level: String,
}

impl Default for ClaimsApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            addressing: Addressing::Auto,
            log_level: "info".to_string(),
        }
    }
}

impl ClaimsApiConfig {
    /// Creates a configuration for the given backend with default settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_addressing(mut self, addressing: Addressing) -> Self {
        self.addressing = addressing;
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Loads configuration from `CLAIMS_API_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(config::Environment::with_prefix("CLAIMS_API"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no request could succeed with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint()?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parsed base URL; route segments are appended to its path
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|err| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        Ok(url)
    }
}
