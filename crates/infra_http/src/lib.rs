//! HTTP Infrastructure Layer
//!
//! Connects the claims domain to the REST backend through `reqwest`.
//! [`HttpClaimsApi`] implements `ClaimsApiPort`; the directory service and
//! the attachment manager use it without knowing about HTTP.
//!
//! # Routes
//!
//! | Operation        | Request                                   |
//! |------------------|-------------------------------------------|
//! | claims           | `GET /api/claims`                         |
//! | stats            | `GET /api/claims/stats`                   |
//! | one claim        | `GET /api/claims/{id}`                    |
//! | attachment list  | `GET /api/claims/{id}/files`              |
//! | upload           | `POST /api/claims/{id}/files` (multipart) |
//! | download, delete | `/api/claims/{id}/files/{fid}` or `/api/files/{fid}` |
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_http::{ClaimsApiConfig, HttpClaimsApi};
//!
//! let api = HttpClaimsApi::new(ClaimsApiConfig::from_env()?)?;
//! let directory = ClaimsDirectory::new(Arc::new(api));
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{disposition_filename, HttpClaimsApi, UPLOAD_FIELD};
pub use config::{Addressing, ClaimsApiConfig, DEFAULT_BASE_URL};
pub use error::ConfigError;
