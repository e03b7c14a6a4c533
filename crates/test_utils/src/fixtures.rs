//! Pre-built Test Fixtures
//!
//! Raw payloads in every shape the claims backend has been observed to
//! return. Tests feed these through the normalizer or preload them into the
//! mock backend, so they stay as close to the wire as possible.

use serde_json::{json, Value};

use core_kernel::ClaimId;
use domain_claims::ports::mock::MockClaimsApi;

/// Raw claim payloads, one per backend generation
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// Claim number of [`ClaimFixtures::current`]
    pub const CURRENT_NUMBER: &'static str = "FL-2024-0001";

    /// Current backend: `policyholder_*` naming, full detail
    pub fn current() -> Value {
        merged([
            json!({
                "id": 1,
                "claim_number": Self::CURRENT_NUMBER,
                "claim_status": "in_review",
                "priority": "high",
                "policyholder_name": "Maria Delgado",
                "policyholder_email": "maria@example.com",
                "policyholder_phone": "555-0100",
                "policy_number": "NFIP-88123",
                "created_at": "2024-09-28 09:15:00",
                "updated_at": "2024-10-02T10:30:00Z"
            }),
            json!({
                "loss_address": "12 Bay St",
                "loss_city": "Tampa",
                "loss_state": "FL",
                "loss_zip": "33602",
                "loss_date": "2024-09-27",
                "cause_of_loss": "Flood",
                "property_type": "Single Family",
                "estimated_loss_amount": 50000,
                "paid_amount": "12,500.00"
            }),
            json!({
                "building_coverage": 250000,
                "contents_coverage": 100000,
                "building_deductible": 1250,
                "contents_deductible": 1250,
                "mortgagee_name": "Gulf Coast Bank",
                "mortgagee_address": "1 Main St, Tampa, FL"
            }),
            json!({
                "building_type": "Residential",
                "occupancy": "Owner",
                "construction_type": "Frame",
                "foundation": "Slab",
                "flood_zone": "AE",
                "number_of_floors": 2,
                "date_of_construction": "1998-06-01"
            }),
            json!({
                "tracking_number": "TRK-554",
                "edn": "EDN-1001",
                "ia_firm_file_number": "IA-77",
                "assigned_adjuster_initials": "JRS",
                "date_assigned": "2024-09-29T14:00:00Z",
                "report_date": "2024-10-01"
            }),
            json!({
                "activities": [
                    {"id": 11, "description": "Inspection scheduled", "created_at": "2024-09-30T09:00:00Z"},
                    {"id": 10, "description": "Claim created", "created_at": "2024-09-28T09:15:00Z"}
                ]
            }),
        ])
    }

    /// Legacy backend: `insured_*` naming, `status`, bare `estimated_loss`
    pub fn legacy() -> Value {
        json!({
            "id": "7",
            "status": "New",
            "insured_name": "Tom Becker",
            "insured_email": "tom@example.com",
            "policy_no": "P-100",
            "loss_street": "4 Elm Rd",
            "city": "Mobile",
            "state": "AL",
            "zip_code": "36602",
            "date_of_loss": "09/14/2023",
            "loss_cause": "Wind",
            "estimated_loss": "$8,400",
            "assigned_adjuster": "Kim",
            "activity_log": [
                {"activity_id": "a1", "note": "Opened", "timestamp": "2023-09-15"}
            ]
        })
    }

    /// Spreadsheet import: `rc` amounts, `file_number`, epoch-millis dates
    pub fn imported() -> Value {
        json!({
            "uuid": "c0ffee",
            "file_number": "IMP-3",
            "insured": "Lee Park",
            "rc": "1.5e4",
            "loss_date": 1694649600000i64,
            "floors": "3"
        })
    }

    /// A claim with nothing but an identifier
    pub fn bare(id: u64) -> Value {
        json!({"id": id})
    }

    pub fn all() -> Vec<Value> {
        vec![Self::current(), Self::legacy(), Self::imported()]
    }
}

/// Raw stats payloads
pub struct StatsFixtures;

impl StatsFixtures {
    pub fn current() -> Value {
        json!({
            "total_claims": 1,
            "total_estimated_loss": 50000,
            "total_paid": 12500,
            "avg_days_to_close": 18.5
        })
    }

    /// Older backend: camel case and numeric strings
    pub fn legacy() -> Value {
        json!({"totalClaims": "42", "rc_total": "1,250,000.75"})
    }
}

/// Raw attachment payloads
pub struct AttachmentFixtures;

impl AttachmentFixtures {
    pub fn stored(id: &str, original: &str) -> Value {
        json!({
            "id": id,
            "filename": format!("1712000000-{}", original),
            "original_filename": original,
            "file_size": 1536,
            "uploaded_at": "2024-10-01T12:00:00Z"
        })
    }

    /// Older listing shape without original names
    pub fn legacy(id: &str, name: &str) -> Value {
        json!({"file_id": id, "file_name": name, "size": "2048", "created_at": "2024-01-05"})
    }
}

/// Ready-made mock backends
pub struct BackendFixtures;

impl BackendFixtures {
    /// One claim with a $50,000 estimated loss, and matching stats
    pub fn single_claim() -> MockClaimsApi {
        MockClaimsApi::new()
            .with_claims(vec![ClaimFixtures::current()])
            .with_stats(StatsFixtures::current())
    }

    /// Every fixture claim, plus legacy stats
    pub fn mixed_versions() -> MockClaimsApi {
        MockClaimsApi::new()
            .with_claims(ClaimFixtures::all())
            .with_stats(StatsFixtures::legacy())
    }

    /// Identifier of [`ClaimFixtures::current`]
    pub fn current_claim_id() -> ClaimId {
        ClaimId::from(1u64)
    }
}

/// Joins object literals into one object; later keys win
fn merged<const N: usize>(parts: [Value; N]) -> Value {
    let mut record = serde_json::Map::new();
    for part in parts {
        if let Value::Object(fields) = part {
            record.extend(fields);
        }
    }
    Value::Object(record)
}
