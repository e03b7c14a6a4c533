//! Core Kernel - Foundational types for the claims dashboard
//!
//! This crate provides the building blocks shared by the claims domain and
//! its adapters:
//! - Opaque identifiers for claims, attachments, and activity entries
//! - Money with locale-fixed whole-dollar formatting
//! - Display dates with an explicit unknown sentinel
//! - The error type every port implementation reports

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, MoneyError, USD_SYMBOL, format_currency};
pub use temporal::{DateValue, UNKNOWN_DATE};
pub use identifiers::{ClaimId, AttachmentId, ActivityId};
pub use ports::{PortError, DomainPort};
pub use error::CoreError;
