//! ClaimRecord normalization
//!
//! Backend versions have renamed almost every claim field at least once
//! (`insured_name` → `policyholder_name`, `estimated_loss` →
//! `estimated_loss_amount`, ...). Each canonical field therefore resolves from
//! an ordered list of wire names; the tables below are the single source of
//! truth for that resolution. The first source holding a usable value wins;
//! later sources are only consulted when earlier ones are absent, null,
//! blank, or do not parse.
//!
//! Normalization is pure and never fails. Whatever is missing or malformed
//! falls back to the display defaults defined on the model.

use chrono::DateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

use core_kernel::{ActivityId, AttachmentId, ClaimId, DateValue, Money};

use crate::attachment::Attachment;
use crate::claim::{
    Activity, Assignment, BuildingInfo, Claim, ClaimStatus, Coverage, LossAddress, LossDetails,
    Policyholder, Priority, NOT_AVAILABLE, UNASSIGNED,
};
use crate::stats::ClaimsStats;

/// A table mapping canonical fields to their ordered wire names
pub trait SourceTable: Copy {
    /// Wire names, most preferred first
    fn sources(self) -> &'static [&'static str];
}

/// Canonical claim fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimField {
    Id,
    ClaimNumber,
    Status,
    Priority,
    PolicyholderName,
    PolicyholderEmail,
    PolicyholderPhone,
    PolicyNumber,
    LossStreet,
    LossCity,
    LossState,
    LossZip,
    LossDate,
    CauseOfLoss,
    PropertyType,
    EstimatedLoss,
    PaidAmount,
    BuildingCoverage,
    ContentsCoverage,
    BuildingDeductible,
    ContentsDeductible,
    MortgageeName,
    MortgageeAddress,
    BuildingType,
    Occupancy,
    ConstructionType,
    Foundation,
    FloodZone,
    FloorCount,
    ConstructionDate,
    TrackingNumber,
    Edn,
    IaFirmFileNumber,
    AssignedTo,
    DateAssigned,
    ReportDate,
    CreatedAt,
    UpdatedAt,
    Activities,
}

impl ClaimField {
    pub const ALL: &'static [ClaimField] = &[
        ClaimField::Id,
        ClaimField::ClaimNumber,
        ClaimField::Status,
        ClaimField::Priority,
        ClaimField::PolicyholderName,
        ClaimField::PolicyholderEmail,
        ClaimField::PolicyholderPhone,
        ClaimField::PolicyNumber,
        ClaimField::LossStreet,
        ClaimField::LossCity,
        ClaimField::LossState,
        ClaimField::LossZip,
        ClaimField::LossDate,
        ClaimField::CauseOfLoss,
        ClaimField::PropertyType,
        ClaimField::EstimatedLoss,
        ClaimField::PaidAmount,
        ClaimField::BuildingCoverage,
        ClaimField::ContentsCoverage,
        ClaimField::BuildingDeductible,
        ClaimField::ContentsDeductible,
        ClaimField::MortgageeName,
        ClaimField::MortgageeAddress,
        ClaimField::BuildingType,
        ClaimField::Occupancy,
        ClaimField::ConstructionType,
        ClaimField::Foundation,
        ClaimField::FloodZone,
        ClaimField::FloorCount,
        ClaimField::ConstructionDate,
        ClaimField::TrackingNumber,
        ClaimField::Edn,
        ClaimField::IaFirmFileNumber,
        ClaimField::AssignedTo,
        ClaimField::DateAssigned,
        ClaimField::ReportDate,
        ClaimField::CreatedAt,
        ClaimField::UpdatedAt,
        ClaimField::Activities,
    ];
}

impl SourceTable for ClaimField {
    fn sources(self) -> &'static [&'static str] {
        match self {
            ClaimField::Id => &["id", "claim_id", "uuid"],
            ClaimField::ClaimNumber => &["claim_number", "file_number", "claim_no"],
            ClaimField::Status => &["claim_status", "status"],
            ClaimField::Priority => &["priority", "claim_priority"],
            ClaimField::PolicyholderName => &["policyholder_name", "insured_name", "insured"],
            ClaimField::PolicyholderEmail => &["policyholder_email", "insured_email", "email"],
            ClaimField::PolicyholderPhone => &["policyholder_phone", "insured_phone", "phone"],
            ClaimField::PolicyNumber => &["policy_number", "policy_no"],
            ClaimField::LossStreet => &["loss_address", "loss_street", "property_address"],
            ClaimField::LossCity => &["loss_city", "city"],
            ClaimField::LossState => &["loss_state", "state"],
            ClaimField::LossZip => &["loss_zip", "zip", "zip_code"],
            ClaimField::LossDate => &["loss_date", "date_of_loss"],
            ClaimField::CauseOfLoss => &["cause_of_loss", "loss_cause"],
            ClaimField::PropertyType => &["property_type"],
            ClaimField::EstimatedLoss => &["estimated_loss_amount", "estimated_loss", "rc"],
            ClaimField::PaidAmount => &["paid_amount", "paid", "total_paid"],
            ClaimField::BuildingCoverage => &["building_coverage"],
            ClaimField::ContentsCoverage => &["contents_coverage"],
            ClaimField::BuildingDeductible => &["building_deductible"],
            ClaimField::ContentsDeductible => &["contents_deductible"],
            ClaimField::MortgageeName => &["mortgagee_name"],
            ClaimField::MortgageeAddress => &["mortgagee_address"],
            ClaimField::BuildingType => &["building_type"],
            ClaimField::Occupancy => &["occupancy"],
            ClaimField::ConstructionType => &["construction_type", "construction"],
            ClaimField::Foundation => &["foundation", "foundation_type"],
            ClaimField::FloodZone => &["flood_zone"],
            ClaimField::FloorCount => &["number_of_floors", "floors"],
            ClaimField::ConstructionDate => &["date_of_construction", "construction_date"],
            ClaimField::TrackingNumber => &["tracking_number"],
            ClaimField::Edn => &["edn"],
            ClaimField::IaFirmFileNumber => &["ia_firm_file_number", "ia_file_number"],
            ClaimField::AssignedTo => &[
                "assigned_adjuster_initials",
                "assigned_adjuster",
                "assigned_to",
            ],
            ClaimField::DateAssigned => &["date_assigned", "assigned_at"],
            ClaimField::ReportDate => &["report_date", "reported_at"],
            ClaimField::CreatedAt => &["created_at", "created"],
            ClaimField::UpdatedAt => &["updated_at", "updated"],
            ClaimField::Activities => &["activities", "activity_log"],
        }
    }
}

/// Activity entry fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityField {
    Id,
    Description,
    CreatedAt,
}

impl SourceTable for ActivityField {
    fn sources(self) -> &'static [&'static str] {
        match self {
            ActivityField::Id => &["id", "activity_id"],
            ActivityField::Description => &["description", "note"],
            ActivityField::CreatedAt => &["created_at", "timestamp"],
        }
    }
}

/// Attachment fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentField {
    Id,
    ClaimId,
    Filename,
    OriginalFilename,
    Size,
    UploadedAt,
}

impl SourceTable for AttachmentField {
    fn sources(self) -> &'static [&'static str] {
        match self {
            AttachmentField::Id => &["id", "file_id"],
            AttachmentField::ClaimId => &["claim_id"],
            AttachmentField::Filename => &["filename", "file_name", "stored_name"],
            AttachmentField::OriginalFilename => &["original_filename", "original_name"],
            AttachmentField::Size => &["file_size", "size", "bytes"],
            AttachmentField::UploadedAt => &["uploaded_at", "created_at"],
        }
    }
}

/// Stats fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsField {
    TotalClaims,
    TotalEstimatedLoss,
    TotalPaid,
    AvgDaysToClose,
}

impl SourceTable for StatsField {
    fn sources(self) -> &'static [&'static str] {
        match self {
            StatsField::TotalClaims => &["total_claims", "totalClaims", "count"],
            StatsField::TotalEstimatedLoss => &[
                "total_estimated_loss",
                "totalEstimatedLoss",
                "rc_total",
            ],
            StatsField::TotalPaid => &["total_paid", "paid_total"],
            StatsField::AvgDaysToClose => &["avg_days_to_close", "average_days_to_close"],
        }
    }
}

/// Read-only view over one raw JSON object
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> RawRecord<'a> {
    /// Wraps a raw value; non-objects behave as an object with no fields
    pub fn new(raw: &'a Value) -> Self {
        Self {
            fields: raw.as_object(),
        }
    }

    /// First source of `field` for which `parse` yields a value
    pub fn resolve<F, T>(&self, field: F, parse: impl Fn(&'a Value) -> Option<T>) -> Option<T>
    where
        F: SourceTable,
    {
        let fields = self.fields?;
        field
            .sources()
            .iter()
            .filter_map(|name| fields.get(*name))
            .find_map(parse)
    }

    pub fn text<F: SourceTable>(&self, field: F) -> Option<String> {
        self.resolve(field, as_text)
    }

    pub fn text_or<F: SourceTable>(&self, field: F, default: &str) -> String {
        self.text(field).unwrap_or_else(|| default.to_string())
    }

    pub fn decimal<F: SourceTable>(&self, field: F) -> Option<Decimal> {
        self.resolve(field, as_decimal)
    }

    /// USD amount, zero when absent or malformed
    pub fn amount<F: SourceTable>(&self, field: F) -> Money {
        Money::usd(self.decimal(field).unwrap_or_default())
    }

    pub fn date<F: SourceTable>(&self, field: F) -> DateValue {
        self.resolve(field, as_date).unwrap_or(DateValue::Unknown)
    }

    pub fn count<F: SourceTable>(&self, field: F) -> Option<u64> {
        self.resolve(field, as_count)
    }

    pub fn array<F: SourceTable>(&self, field: F) -> Option<&'a Vec<Value>> {
        self.resolve(field, Value::as_array)
    }
}

/// Normalizes one raw claim of any known shape
pub fn normalize_claim(raw: &Value) -> Claim {
    let record = RawRecord::new(raw);
    let text = |field: ClaimField| record.text_or(field, NOT_AVAILABLE);
    let part = |field: ClaimField| record.text(field).unwrap_or_default();

    let id = record.text(ClaimField::Id).map(ClaimId::new).unwrap_or_default();
    let claim_number = record
        .text(ClaimField::ClaimNumber)
        .or_else(|| id.display_number())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    Claim {
        claim_number,
        status: record
            .text(ClaimField::Status)
            .map(|raw| ClaimStatus::parse(&raw))
            .unwrap_or_default(),
        priority: record
            .text(ClaimField::Priority)
            .map(|raw| Priority::parse(&raw))
            .unwrap_or_default(),
        policyholder: Policyholder {
            name: text(ClaimField::PolicyholderName),
            email: text(ClaimField::PolicyholderEmail),
            phone: text(ClaimField::PolicyholderPhone),
        },
        policy_number: text(ClaimField::PolicyNumber),
        loss: LossDetails {
            address: LossAddress {
                street: part(ClaimField::LossStreet),
                city: part(ClaimField::LossCity),
                state: part(ClaimField::LossState),
                zip: part(ClaimField::LossZip),
            },
            date: record.date(ClaimField::LossDate),
            cause: text(ClaimField::CauseOfLoss),
            property_type: text(ClaimField::PropertyType),
            estimated_amount: record.amount(ClaimField::EstimatedLoss),
        },
        paid_amount: record.amount(ClaimField::PaidAmount),
        coverage: Coverage {
            building_coverage: record.amount(ClaimField::BuildingCoverage),
            contents_coverage: record.amount(ClaimField::ContentsCoverage),
            building_deductible: record.amount(ClaimField::BuildingDeductible),
            contents_deductible: record.amount(ClaimField::ContentsDeductible),
            mortgagee_name: text(ClaimField::MortgageeName),
            mortgagee_address: text(ClaimField::MortgageeAddress),
        },
        building: BuildingInfo {
            building_type: text(ClaimField::BuildingType),
            occupancy: text(ClaimField::Occupancy),
            construction_type: text(ClaimField::ConstructionType),
            foundation: text(ClaimField::Foundation),
            flood_zone: text(ClaimField::FloodZone),
            floor_count: record
                .count(ClaimField::FloorCount)
                .and_then(|floors| u32::try_from(floors).ok()),
            construction_date: record.date(ClaimField::ConstructionDate),
        },
        assignment: Assignment {
            tracking_number: text(ClaimField::TrackingNumber),
            edn: text(ClaimField::Edn),
            ia_firm_file_number: text(ClaimField::IaFirmFileNumber),
            assigned_to: record.text_or(ClaimField::AssignedTo, UNASSIGNED),
            date_assigned: record.date(ClaimField::DateAssigned),
            report_date: record.date(ClaimField::ReportDate),
        },
        created_at: record.date(ClaimField::CreatedAt),
        updated_at: record.date(ClaimField::UpdatedAt),
        activities: record
            .array(ClaimField::Activities)
            .map(|entries| normalize_activities(entries))
            .unwrap_or_default(),
        id,
    }
}

/// Normalizes a claim collection, skipping entries that are not objects
pub fn normalize_claims(raw: &[Value]) -> Vec<Claim> {
    raw.iter()
        .filter(|entry| entry.is_object())
        .map(normalize_claim)
        .collect()
}

/// Normalizes activity entries, oldest first; undated entries keep their
/// wire order after all dated ones
pub fn normalize_activities(raw: &[Value]) -> Vec<Activity> {
    let mut activities: Vec<Activity> = raw
        .iter()
        .filter(|entry| entry.is_object())
        .enumerate()
        .map(|(position, entry)| {
            let record = RawRecord::new(entry);
            Activity {
                id: record
                    .text(ActivityField::Id)
                    .map(ActivityId::new)
                    .unwrap_or_else(|| ActivityId::from(position as u64)),
                description: record.text_or(ActivityField::Description, NOT_AVAILABLE),
                created_at: record.date(ActivityField::CreatedAt),
            }
        })
        .collect();
    activities.sort_by(|a, b| a.created_at.cmp_unknown_last(&b.created_at));
    activities
}

/// Normalizes one attachment; `None` when it carries no identifier, since
/// such an entry can be neither downloaded nor deleted
pub fn normalize_attachment(raw: &Value, owner: &ClaimId) -> Option<Attachment> {
    let record = RawRecord::new(raw);
    let id = record.text(AttachmentField::Id).map(AttachmentId::new)?;
    let original_filename = record.text(AttachmentField::OriginalFilename);
    let filename = record
        .text(AttachmentField::Filename)
        .or_else(|| original_filename.clone())
        .unwrap_or_else(|| format!("attachment-{}", id));

    Some(Attachment {
        claim_id: record
            .text(AttachmentField::ClaimId)
            .map(ClaimId::new)
            .unwrap_or_else(|| owner.clone()),
        filename,
        original_filename,
        size_bytes: record.count(AttachmentField::Size).unwrap_or(0),
        uploaded_at: record.date(AttachmentField::UploadedAt),
        id,
    })
}

pub fn normalize_attachments(raw: &[Value], owner: &ClaimId) -> Vec<Attachment> {
    raw.iter()
        .filter_map(|entry| normalize_attachment(entry, owner))
        .collect()
}

/// Normalizes aggregate stats; unparseable numbers count as zero
pub fn normalize_stats(raw: &Value) -> ClaimsStats {
    let record = RawRecord::new(raw);
    ClaimsStats {
        total_claims: record.count(StatsField::TotalClaims).unwrap_or(0),
        total_estimated_loss: record.amount(StatsField::TotalEstimatedLoss),
        total_paid: record.amount(StatsField::TotalPaid),
        avg_days_to_close: record.decimal(StatsField::AvgDaysToClose).unwrap_or_default(),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let repr = n.to_string();
            Decimal::from_str(&repr)
                .or_else(|_| Decimal::from_scientific(&repr))
                .ok()
        }
        Value::String(s) => Money::parse(s).ok().map(|m| m.amount()),
        _ => None,
    }
}

fn as_count(value: &Value) -> Option<u64> {
    as_decimal(value)
        .filter(|n| !n.is_sign_negative())
        .and_then(|n| n.trunc().to_u64())
}

fn as_date(value: &Value) -> Option<DateValue> {
    match value {
        Value::String(s) => Some(DateValue::parse(s)).filter(DateValue::is_known),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(DateValue::Known),
        _ => None,
    }
}
