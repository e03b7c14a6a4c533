//! Test Utilities Crate
//!
//! Shared test infrastructure for the claims dashboard.
//!
//! # Modules
//!
//! - `fixtures`: Raw payloads for every observed backend version
//! - `builders`: Builders for raw claims and upload selections
//! - `assertions`: Assertion helpers for outcomes and view state
//! - `generators`: Property-based wire value generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
