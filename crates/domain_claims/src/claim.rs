//! Canonical claim view model
//!
//! Every field here is already resolved: strings carry their display default,
//! amounts default to zero and dates to the unknown sentinel. Nothing in a
//! `Claim` needs further null handling before rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ActivityId, ClaimId, DateValue, Money};

/// Display default for an absent text field
pub const NOT_AVAILABLE: &str = "N/A";

/// Display default for a claim with no adjuster
pub const UNASSIGNED: &str = "Unassigned";

/// Claim status
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    #[default]
    New,
    InReview,
    Approved,
    Closed,
    /// A status this client does not know, kept verbatim
    Other(String),
}

impl ClaimStatus {
    /// Parses a wire status; case, spaces and hyphens are not significant
    pub fn parse(raw: &str) -> Self {
        let key = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "new" => ClaimStatus::New,
            "in_review" => ClaimStatus::InReview,
            "approved" => ClaimStatus::Approved,
            "closed" => ClaimStatus::Closed,
            _ => ClaimStatus::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ClaimStatus::New => "new",
            ClaimStatus::InReview => "in_review",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Closed => "closed",
            ClaimStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    /// Parses a wire priority; anything unrecognized is `Normal`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Priority::Low,
            "high" => Priority::High,
            _ => Priority::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policyholder contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policyholder {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Policyholder {
    /// True when the wire carried a name rather than the display default
    pub fn has_name(&self) -> bool {
        self.name != NOT_AVAILABLE
    }
}

impl Default for Policyholder {
    fn default() -> Self {
        Self {
            name: NOT_AVAILABLE.to_string(),
            email: NOT_AVAILABLE.to_string(),
            phone: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Loss location; absent parts stay empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl fmt::Display for LossAddress {
    /// `street, city, state zip`, with `N/A` standing in for the street
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.street.is_empty() {
            f.write_str(NOT_AVAILABLE)?;
        } else {
            f.write_str(&self.street)?;
        }
        if !self.city.is_empty() {
            write!(f, ", {}", self.city)?;
        }
        if !self.state.is_empty() {
            write!(f, ", {}", self.state)?;
        }
        if !self.zip.is_empty() {
            write!(f, " {}", self.zip)?;
        }
        Ok(())
    }
}

/// What happened and what it is estimated to cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossDetails {
    pub address: LossAddress,
    pub date: DateValue,
    pub cause: String,
    pub property_type: String,
    pub estimated_amount: Money,
}

impl Default for LossDetails {
    fn default() -> Self {
        Self {
            address: LossAddress::default(),
            date: DateValue::Unknown,
            cause: NOT_AVAILABLE.to_string(),
            property_type: NOT_AVAILABLE.to_string(),
            estimated_amount: Money::default(),
        }
    }
}

/// Coverage limits, deductibles and the mortgagee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    pub building_coverage: Money,
    pub contents_coverage: Money,
    pub building_deductible: Money,
    pub contents_deductible: Money,
    pub mortgagee_name: String,
    pub mortgagee_address: String,
}

impl Coverage {
    /// True when any coverage figure or the mortgagee was supplied
    pub fn is_reported(&self) -> bool {
        !self.building_coverage.is_zero()
            || !self.contents_coverage.is_zero()
            || self.mortgagee_name != NOT_AVAILABLE
    }
}

impl Default for Coverage {
    fn default() -> Self {
        Self {
            building_coverage: Money::default(),
            contents_coverage: Money::default(),
            building_deductible: Money::default(),
            contents_deductible: Money::default(),
            mortgagee_name: NOT_AVAILABLE.to_string(),
            mortgagee_address: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Building attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingInfo {
    pub building_type: String,
    pub occupancy: String,
    pub construction_type: String,
    pub foundation: String,
    pub flood_zone: String,
    pub floor_count: Option<u32>,
    pub construction_date: DateValue,
}

impl BuildingInfo {
    pub fn floor_count_display(&self) -> String {
        self.floor_count
            .map(|floors| floors.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

impl Default for BuildingInfo {
    fn default() -> Self {
        Self {
            building_type: NOT_AVAILABLE.to_string(),
            occupancy: NOT_AVAILABLE.to_string(),
            construction_type: NOT_AVAILABLE.to_string(),
            foundation: NOT_AVAILABLE.to_string(),
            flood_zone: NOT_AVAILABLE.to_string(),
            floor_count: None,
            construction_date: DateValue::Unknown,
        }
    }
}

/// Who is handling the claim and the references they file it under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub tracking_number: String,
    pub edn: String,
    pub ia_firm_file_number: String,
    pub assigned_to: String,
    pub date_assigned: DateValue,
    pub report_date: DateValue,
}

impl Default for Assignment {
    fn default() -> Self {
        Self {
            tracking_number: NOT_AVAILABLE.to_string(),
            edn: NOT_AVAILABLE.to_string(),
            ia_firm_file_number: NOT_AVAILABLE.to_string(),
            assigned_to: UNASSIGNED.to_string(),
            date_assigned: DateValue::Unknown,
            report_date: DateValue::Unknown,
        }
    }
}

/// One entry of a claim's activity history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub description: String,
    pub created_at: DateValue,
}

/// A claim, normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Opaque identifier; empty only when the wire carried none
    pub id: ClaimId,
    /// Display number; synthesized from the identifier when absent
    pub claim_number: String,
    pub status: ClaimStatus,
    pub priority: Priority,
    pub policyholder: Policyholder,
    pub policy_number: String,
    pub loss: LossDetails,
    /// Amount paid so far
    pub paid_amount: Money,
    pub coverage: Coverage,
    pub building: BuildingInfo,
    pub assignment: Assignment,
    pub created_at: DateValue,
    pub updated_at: DateValue,
    /// Activity history, oldest first
    pub activities: Vec<Activity>,
}

impl Default for Claim {
    fn default() -> Self {
        Self {
            id: ClaimId::default(),
            claim_number: NOT_AVAILABLE.to_string(),
            status: ClaimStatus::default(),
            priority: Priority::default(),
            policyholder: Policyholder::default(),
            policy_number: NOT_AVAILABLE.to_string(),
            loss: LossDetails::default(),
            paid_amount: Money::default(),
            coverage: Coverage::default(),
            building: BuildingInfo::default(),
            assignment: Assignment::default(),
            created_at: DateValue::Unknown,
            updated_at: DateValue::Unknown,
            activities: Vec::new(),
        }
    }
}

impl Claim {
    /// Label/value pairs for the detail view, in display order
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Claim", self.claim_number.clone()),
            ("Status", self.status.to_string()),
            ("Priority", format!("{} priority", self.priority)),
            ("Policyholder", self.policyholder.name.clone()),
            ("Email", self.policyholder.email.clone()),
            ("Phone", self.policyholder.phone.clone()),
            ("Policy Number", self.policy_number.clone()),
            ("Loss Location", self.loss.address.to_string()),
            ("Loss Date", self.loss.date.format_short()),
            ("Cause of Loss", self.loss.cause.clone()),
            ("Property Type", self.loss.property_type.clone()),
            ("Estimated Loss", self.loss.estimated_amount.format_whole()),
            ("Paid", self.paid_amount.format_whole()),
            ("Tracking #", self.assignment.tracking_number.clone()),
            ("EDN", self.assignment.edn.clone()),
            ("Date Assigned", self.assignment.date_assigned.format_short()),
            ("IA Firm File #", self.assignment.ia_firm_file_number.clone()),
            ("Assigned To", self.assignment.assigned_to.clone()),
            ("Report Date", self.assignment.report_date.format_short()),
            ("Created", self.created_at.format_short()),
            ("Last Updated", self.updated_at.format_short()),
            ("Building Coverage", self.coverage.building_coverage.format_whole()),
            ("Contents Coverage", self.coverage.contents_coverage.format_whole()),
            ("Building Deductible", self.coverage.building_deductible.format_whole()),
            ("Contents Deductible", self.coverage.contents_deductible.format_whole()),
            ("Mortgagee", self.coverage.mortgagee_name.clone()),
            ("Mortgagee Address", self.coverage.mortgagee_address.clone()),
            ("Building Type", self.building.building_type.clone()),
            ("Occupancy", self.building.occupancy.clone()),
            ("Construction", self.building.construction_type.clone()),
            ("Foundation", self.building.foundation.clone()),
            ("Flood Zone", self.building.flood_zone.clone()),
            ("Floors", self.building.floor_count_display()),
            ("Built", self.building.construction_date.format_short()),
        ]
    }
}
