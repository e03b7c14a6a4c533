//! Display dates with an explicit unknown sentinel
//!
//! Every date on a claim is optional on the wire and arrives in whichever
//! format the backend version happened to emit. `DateValue` captures either a
//! parsed instant or the `Unknown` sentinel, so no absent or malformed date
//! can reach rendering as anything other than the fixed marker.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Marker rendered for an absent or unparseable date
pub const UNKNOWN_DATE: &str = "N/A";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A date resolved from the wire, or the explicit unknown sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum DateValue {
    /// A timestamp; date-only inputs land on midnight UTC
    Known(DateTime<Utc>),
    /// Absent or unparseable on the wire
    #[default]
    Unknown,
}

impl DateValue {
    /// Parses any of the timestamp shapes the claims API has used.
    ///
    /// Never fails: anything unrecognized becomes `Unknown`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return DateValue::Unknown;
        }

        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return DateValue::Known(parsed.with_timezone(&Utc));
        }

        for format in NAIVE_DATETIME_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
                return DateValue::Known(parsed.and_utc());
            }
        }

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
                return Self::from_date(date);
            }
        }

        DateValue::Unknown
    }

    /// Creates a known value at midnight UTC of the given day
    pub fn from_date(date: NaiveDate) -> Self {
        date.and_hms_opt(0, 0, 0)
            .map(|midnight| DateValue::Known(midnight.and_utc()))
            .unwrap_or(DateValue::Unknown)
    }

    /// Returns true if the date was resolved
    pub fn is_known(&self) -> bool {
        matches!(self, DateValue::Known(_))
    }

    /// Returns the instant, if known
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            DateValue::Known(at) => Some(*at),
            DateValue::Unknown => None,
        }
    }

    /// en-US short form, e.g. `Jan 5, 2024`; `N/A` when unknown
    pub fn format_short(&self) -> String {
        match self {
            DateValue::Known(at) => at.format("%b %-d, %Y").to_string(),
            DateValue::Unknown => UNKNOWN_DATE.to_string(),
        }
    }

    /// Chronological order with unknown dates sorted after every known one
    pub fn cmp_unknown_last(&self, other: &Self) -> Ordering {
        match (self, other) {
            (DateValue::Known(a), DateValue::Known(b)) => a.cmp(b),
            (DateValue::Known(_), DateValue::Unknown) => Ordering::Less,
            (DateValue::Unknown, DateValue::Known(_)) => Ordering::Greater,
            (DateValue::Unknown, DateValue::Unknown) => Ordering::Equal,
        }
    }
}

impl From<DateTime<Utc>> for DateValue {
    fn from(at: DateTime<Utc>) -> Self {
        DateValue::Known(at)
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_short())
    }
}
