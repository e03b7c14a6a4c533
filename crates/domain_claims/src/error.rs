//! Claims domain errors
//!
//! Three families of failure reach the presentation layer: transport
//! (unreachable backend, non-2xx, envelope with `success: false`), decode
//! (a body that does not have the expected shape) and validation (an
//! operation that was rejected before any request was issued).

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use core_kernel::{ClaimId, PortError};

/// Errors raised by the claims domain
#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("{0}")]
    Transport(#[source] PortError),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Request rejected by server: {0}")]
    Rejected(String),

    #[error("Could not save {filename}: {message}")]
    Save { filename: String, message: String },
}

impl ClaimsError {
    pub fn decode(message: impl Into<String>) -> Self {
        ClaimsError::Decode(message.into())
    }

    /// Classifies the error for the presentation layer
    pub fn kind(&self) -> FailureKind {
        match self {
            ClaimsError::Transport(_) | ClaimsError::Rejected(_) => FailureKind::Transport,
            ClaimsError::Decode(_) => FailureKind::Decode,
            ClaimsError::Save { .. } => FailureKind::LocalSave,
        }
    }

    /// Renders a human-readable notice, prefixed with what was being attempted
    pub fn notice(&self, context: &str) -> Notice {
        Notice::new(self.kind(), format!("{}: {}", context, self))
    }
}

impl From<PortError> for ClaimsError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Transformation { message } => ClaimsError::Decode(message),
            other => ClaimsError::Transport(other),
        }
    }
}

/// An operation rejected before any network call was made
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No files selected")]
    EmptySelection,

    #[error("Deletion of {filename} was not confirmed")]
    Unconfirmed { filename: String },

    #[error("Another change to claim {claim_id} is still in progress")]
    MutationInFlight { claim_id: ClaimId },
}

/// Failure classification surfaced with every notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Decode,
    Validation,
    LocalSave,
}

/// A renderable "last operation failed" signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: FailureKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
