//! Opaque identifiers for dashboard entities
//!
//! Backend versions disagree on identifier shape (integers, UUIDs, prefixed
//! strings), so identifiers are newtypes over the trimmed wire text. They are
//! never interpreted beyond equality and route formatting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from raw wire text
            pub fn new(raw: impl Into<String>) -> Self {
                let raw = raw.into();
                let trimmed = raw.trim();
                if trimmed.len() == raw.len() {
                    Self(raw)
                } else {
                    Self(trimmed.to_string())
                }
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn generate() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Returns the raw identifier text
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true when the wire carried no usable identifier
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Returns the identifier prefix used for synthesized display numbers
            pub fn prefix() -> &'static str {
                $prefix
            }

            /// Returns `<PREFIX>-<id>`, or `None` for an empty identifier
            pub fn display_number(&self) -> Option<String> {
                if self.is_empty() {
                    None
                } else {
                    Some(format!("{}-{}", Self::prefix(), self.0))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(String::new())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let id = Self::new(s);
                if id.is_empty() {
                    return Err(CoreError::validation(concat!(
                        stringify!($name),
                        " must not be empty"
                    )));
                }
                Ok(id)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self::new(raw)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid.to_string())
            }
        }
    };
}

define_id!(ClaimId, "CLM");
define_id!(AttachmentId, "ATT");
define_id!(ActivityId, "ACT");
