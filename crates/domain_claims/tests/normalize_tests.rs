//! Tests for claim, attachment and stats normalization
//!
//! Every canonical field is checked against every wire name in its
//! resolution table, plus the fixtures captured from each backend version.

use proptest::prelude::*;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::{format_currency, ClaimId};
use domain_claims::normalize::{
    normalize_activities, normalize_attachment, normalize_attachments, normalize_claim,
    normalize_claims, normalize_stats, ClaimField, SourceTable,
};
use domain_claims::{Claim, ClaimStatus, Priority, NOT_AVAILABLE, UNASSIGNED};
use test_utils::{
    absent_value_strategy, assert_fully_rendered, name_source_strategy, raw_claim_strategy,
    wire_amount_strategy, wire_date_strategy, AttachmentFixtures, ClaimFixtures, RawClaimBuilder,
    StatsFixtures,
};

/// How a canonical field is typed on the wire
#[derive(Debug, Clone, Copy)]
enum Kind {
    Text,
    Status,
    Priority,
    Amount,
    Date,
    Count,
    Activities,
}

fn kind(field: ClaimField) -> Kind {
    use ClaimField as F;
    match field {
        F::Status => Kind::Status,
        F::Priority => Kind::Priority,
        F::EstimatedLoss
        | F::PaidAmount
        | F::BuildingCoverage
        | F::ContentsCoverage
        | F::BuildingDeductible
        | F::ContentsDeductible => Kind::Amount,
        F::LossDate
        | F::ConstructionDate
        | F::DateAssigned
        | F::ReportDate
        | F::CreatedAt
        | F::UpdatedAt => Kind::Date,
        F::FloorCount => Kind::Count,
        F::Activities => Kind::Activities,
        _ => Kind::Text,
    }
}

/// Two distinct wire samples and what each renders as
fn samples(kind: Kind) -> [(Value, &'static str); 2] {
    match kind {
        Kind::Text => [(json!("First"), "First"), (json!("Second"), "Second")],
        Kind::Status => [(json!("closed"), "closed"), (json!("approved"), "approved")],
        Kind::Priority => [(json!("low"), "low"), (json!("high"), "high")],
        Kind::Amount => [(json!(100), "100"), (json!("$2,000"), "2000")],
        Kind::Date => [
            (json!("2024-01-05"), "Jan 5, 2024"),
            (json!("2023-02-06T08:00:00Z"), "Feb 6, 2023"),
        ],
        Kind::Count => [(json!(3), "3"), (json!("4"), "4")],
        Kind::Activities => [
            (json!([{"id": 1, "description": "a"}]), "1"),
            (json!([{"id": 1, "description": "a"}, {"id": 2, "description": "b"}]), "2"),
        ],
    }
}

/// The rendered value of one canonical field
fn rendered(claim: &Claim, field: ClaimField) -> String {
    use ClaimField as F;
    match field {
        F::Id => claim.id.to_string(),
        F::ClaimNumber => claim.claim_number.clone(),
        F::Status => claim.status.to_string(),
        F::Priority => claim.priority.to_string(),
        F::PolicyholderName => claim.policyholder.name.clone(),
        F::PolicyholderEmail => claim.policyholder.email.clone(),
        F::PolicyholderPhone => claim.policyholder.phone.clone(),
        F::PolicyNumber => claim.policy_number.clone(),
        F::LossStreet => claim.loss.address.street.clone(),
        F::LossCity => claim.loss.address.city.clone(),
        F::LossState => claim.loss.address.state.clone(),
        F::LossZip => claim.loss.address.zip.clone(),
        F::LossDate => claim.loss.date.format_short(),
        F::CauseOfLoss => claim.loss.cause.clone(),
        F::PropertyType => claim.loss.property_type.clone(),
        F::EstimatedLoss => claim.loss.estimated_amount.amount().normalize().to_string(),
        F::PaidAmount => claim.paid_amount.amount().normalize().to_string(),
        F::BuildingCoverage => claim.coverage.building_coverage.amount().normalize().to_string(),
        F::ContentsCoverage => claim.coverage.contents_coverage.amount().normalize().to_string(),
        F::BuildingDeductible => claim.coverage.building_deductible.amount().normalize().to_string(),
        F::ContentsDeductible => claim.coverage.contents_deductible.amount().normalize().to_string(),
        F::MortgageeName => claim.coverage.mortgagee_name.clone(),
        F::MortgageeAddress => claim.coverage.mortgagee_address.clone(),
        F::BuildingType => claim.building.building_type.clone(),
        F::Occupancy => claim.building.occupancy.clone(),
        F::ConstructionType => claim.building.construction_type.clone(),
        F::Foundation => claim.building.foundation.clone(),
        F::FloodZone => claim.building.flood_zone.clone(),
        F::FloorCount => claim.building.floor_count_display(),
        F::ConstructionDate => claim.building.construction_date.format_short(),
        F::TrackingNumber => claim.assignment.tracking_number.clone(),
        F::Edn => claim.assignment.edn.clone(),
        F::IaFirmFileNumber => claim.assignment.ia_firm_file_number.clone(),
        F::AssignedTo => claim.assignment.assigned_to.clone(),
        F::DateAssigned => claim.assignment.date_assigned.format_short(),
        F::ReportDate => claim.assignment.report_date.format_short(),
        F::CreatedAt => claim.created_at.format_short(),
        F::UpdatedAt => claim.updated_at.format_short(),
        F::Activities => claim.activities.len().to_string(),
    }
}

fn single(name: &str, value: Value) -> Value {
    let mut raw = serde_json::Map::new();
    raw.insert(name.to_string(), value);
    Value::Object(raw)
}

// ============================================================================
// Resolution Table Tests
// ============================================================================

mod resolution_table_tests {
    use super::*;

    #[test]
    fn test_every_source_resolves_its_field() {
        for &field in ClaimField::ALL {
            let [(value, expected), _] = samples(kind(field));
            for source in field.sources() {
                let claim = normalize_claim(&single(source, value.clone()));
                assert_eq!(
                    rendered(&claim, field),
                    expected,
                    "{:?} did not resolve from `{}`",
                    field,
                    source
                );
            }
        }
    }

    #[test]
    fn test_earlier_source_wins() {
        for &field in ClaimField::ALL {
            let sources = field.sources();
            if sources.len() < 2 {
                continue;
            }
            let [(first, expected), (second, _)] = samples(kind(field));
            let raw = json!({ sources[0]: first, sources[1]: second });
            let claim = normalize_claim(&raw);
            assert_eq!(rendered(&claim, field), expected, "{:?} ignored precedence", field);
        }
    }

    #[test]
    fn test_null_source_falls_through() {
        for &field in ClaimField::ALL {
            let sources = field.sources();
            if sources.len() < 2 {
                continue;
            }
            let [_, (second, expected)] = samples(kind(field));
            let raw = json!({ sources[0]: null, sources[1]: second });
            let claim = normalize_claim(&raw);
            assert_eq!(rendered(&claim, field), expected, "{:?} stopped at null", field);
        }
    }
}

// ============================================================================
// Default Tests
// ============================================================================

mod default_tests {
    use super::*;

    #[test]
    fn test_empty_object_yields_defaults() {
        let claim = normalize_claim(&json!({}));

        assert_eq!(claim, Claim::default());
        assert_eq!(claim.claim_number, NOT_AVAILABLE);
        assert_eq!(claim.status, ClaimStatus::New);
        assert_eq!(claim.priority, Priority::Normal);
        assert_eq!(claim.policyholder.name, NOT_AVAILABLE);
        assert_eq!(claim.assignment.assigned_to, UNASSIGNED);
        assert_eq!(claim.loss.estimated_amount.format_whole(), "$0");
        assert_eq!(claim.loss.date.format_short(), "N/A");
        assert!(claim.activities.is_empty());
        assert_fully_rendered(&claim);
    }

    #[test]
    fn test_claim_number_synthesized_from_id() {
        let claim = normalize_claim(&ClaimFixtures::bare(7));
        assert_eq!(claim.claim_number, "CLM-7");
    }

    #[test]
    fn test_address_parts_stay_empty() {
        let claim = normalize_claim(&json!({"loss_city": "Tampa"}));
        assert_eq!(claim.loss.address.street, "");
        assert_eq!(claim.loss.address.to_string(), "N/A, Tampa");
    }

    #[test]
    fn test_unparseable_amount_is_zero() {
        let claim = normalize_claim(&json!({"estimated_loss_amount": "call adjuster"}));
        assert!(claim.loss.estimated_amount.is_zero());
    }

    #[test]
    fn test_invalid_date_is_unknown() {
        let claim = normalize_claim(&json!({"loss_date": "2024-13-45"}));
        assert_eq!(claim.loss.date.format_short(), "N/A");
    }

    #[test]
    fn test_unknown_status_kept_verbatim() {
        let claim = normalize_claim(&json!({"claim_status": "Pending Docs"}));
        assert_eq!(claim.status, ClaimStatus::Other("Pending Docs".to_string()));
    }

    #[test]
    fn test_non_objects_are_skipped_in_collections() {
        let claims = normalize_claims(&[json!(1), json!({"id": 2}), Value::Null]);
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].claim_number, "CLM-2");
    }
}

// ============================================================================
// Fixture Tests
// ============================================================================

mod fixture_tests {
    use super::*;

    #[test]
    fn test_current_backend_claim() {
        let claim = normalize_claim(&ClaimFixtures::current());

        assert_eq!(claim.claim_number, ClaimFixtures::CURRENT_NUMBER);
        assert_eq!(claim.status, ClaimStatus::InReview);
        assert_eq!(claim.priority, Priority::High);
        assert_eq!(claim.policyholder.name, "Maria Delgado");
        assert_eq!(claim.loss.address.to_string(), "12 Bay St, Tampa, FL 33602");
        assert_eq!(claim.loss.estimated_amount.format_whole(), "$50,000");
        assert_eq!(claim.paid_amount.amount(), dec!(12500));
        assert_eq!(claim.building.floor_count, Some(2));
        assert_eq!(claim.assignment.assigned_to, "JRS");
        assert_eq!(claim.assignment.edn, "EDN-1001");
        assert_eq!(claim.created_at.format_short(), "Sep 28, 2024");
        assert_fully_rendered(&claim);
    }

    #[test]
    fn test_current_backend_activities_oldest_first() {
        let claim = normalize_claim(&ClaimFixtures::current());
        let descriptions: Vec<_> = claim.activities.iter().map(|a| a.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Claim created", "Inspection scheduled"]);
    }

    #[test]
    fn test_legacy_backend_claim() {
        let claim = normalize_claim(&ClaimFixtures::legacy());

        assert_eq!(claim.id, ClaimId::from("7"));
        assert_eq!(claim.claim_number, "CLM-7");
        assert_eq!(claim.status, ClaimStatus::New);
        assert_eq!(claim.policyholder.name, "Tom Becker");
        assert_eq!(claim.policy_number, "P-100");
        assert_eq!(claim.loss.address.to_string(), "4 Elm Rd, Mobile, AL 36602");
        assert_eq!(claim.loss.date.format_short(), "Sep 14, 2023");
        assert_eq!(claim.loss.estimated_amount.format_whole(), "$8,400");
        assert_eq!(claim.assignment.assigned_to, "Kim");
        assert_eq!(claim.activities.len(), 1);
        assert_eq!(claim.activities[0].description, "Opened");
    }

    #[test]
    fn test_imported_claim() {
        let claim = normalize_claim(&ClaimFixtures::imported());

        assert_eq!(claim.id, ClaimId::from("c0ffee"));
        assert_eq!(claim.claim_number, "IMP-3");
        assert_eq!(claim.policyholder.name, "Lee Park");
        assert_eq!(claim.loss.estimated_amount.format_whole(), "$15,000");
        assert_eq!(claim.loss.date.format_short(), "Sep 14, 2023");
        assert_eq!(claim.building.floor_count, Some(3));
    }
}

// ============================================================================
// Activity Tests
// ============================================================================

mod activity_tests {
    use super::*;

    #[test]
    fn test_unknown_dates_sort_last_and_stable() {
        let raw = RawClaimBuilder::with_id(1)
            .activity(1, "undated first", None)
            .activity(2, "late", Some("2024-03-01"))
            .activity(3, "undated second", Some("not a date"))
            .activity(4, "early", Some("2024-01-01"))
            .build();
        let claim = normalize_claim(&raw);
        let order: Vec<_> = claim.activities.iter().map(|a| a.description.as_str()).collect();
        assert_eq!(order, vec!["early", "late", "undated first", "undated second"]);
    }

    #[test]
    fn test_activity_defaults() {
        let activities = normalize_activities(&[json!({}), json!("junk")]);
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].description, NOT_AVAILABLE);
        assert!(!activities[0].created_at.is_known());
    }
}

// ============================================================================
// Attachment and Stats Tests
// ============================================================================

mod attachment_tests {
    use super::*;

    #[test]
    fn test_current_attachment_shape() {
        let owner = ClaimId::from(1u64);
        let attachment = normalize_attachment(&AttachmentFixtures::stored("f1", "roof.jpg"), &owner)
            .unwrap();
        assert_eq!(attachment.display_name(), "roof.jpg");
        assert_eq!(attachment.filename, "1712000000-roof.jpg");
        assert_eq!(attachment.size_display(), "1.5 KB");
        assert_eq!(attachment.claim_id, owner);
    }

    #[test]
    fn test_legacy_attachment_shape() {
        let owner = ClaimId::from(1u64);
        let attachment = normalize_attachment(&AttachmentFixtures::legacy("9", "scan.pdf"), &owner)
            .unwrap();
        assert_eq!(attachment.display_name(), "scan.pdf");
        assert_eq!(attachment.original_filename, None);
        assert_eq!(attachment.size_bytes, 2048);
        assert_eq!(attachment.uploaded_at.format_short(), "Jan 5, 2024");
    }

    #[test]
    fn test_attachment_without_id_is_skipped() {
        let owner = ClaimId::from(1u64);
        let list = normalize_attachments(
            &[json!({"filename": "orphan.txt"}), AttachmentFixtures::stored("f2", "a.txt")],
            &owner,
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id.as_str(), "f2");
    }
}

mod stats_tests {
    use super::*;

    #[test]
    fn test_current_stats() {
        let stats = normalize_stats(&StatsFixtures::current());
        assert_eq!(stats.total_claims, 1);
        assert_eq!(stats.total_estimated_loss_display(), "$50,000");
        assert_eq!(stats.total_paid_display(), "$12,500");
        assert_eq!(stats.avg_days_display(), "18.5");
    }

    #[test]
    fn test_legacy_stats() {
        let stats = normalize_stats(&StatsFixtures::legacy());
        assert_eq!(stats.total_claims, 42);
        assert_eq!(stats.total_estimated_loss_display(), "$1,250,001");
        assert!(stats.total_paid.is_zero());
    }

    #[test]
    fn test_unparseable_stats_default_to_zero() {
        let stats = normalize_stats(&json!({"total_claims": "many", "total_estimated_loss": "?"}));
        assert_eq!(stats.total_claims, 0);
        assert_eq!(stats.total_estimated_loss_display(), "$0");
    }

    #[test]
    fn test_currency_formatting_examples() {
        assert_eq!(format_currency(Some(dec!(0))), "$0");
        assert_eq!(format_currency(None), "$0");
        assert_eq!(format_currency(Some(dec!(1234567))), "$1,234,567");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;

    proptest! {
        #[test]
        fn normalize_never_leaves_blank_display_values(raw in raw_claim_strategy()) {
            let claim = normalize_claim(&raw);
            for (label, value) in claim.display_fields() {
                prop_assert!(!value.trim().is_empty(), "{} blank for {}", label, raw);
            }
        }

        #[test]
        fn policyholder_name_precedence(
            preferred in "[A-Z][a-z]{2,8}",
            fallback in "[A-Z][a-z]{2,8}"
        ) {
            let raw = RawClaimBuilder::new().insured(&fallback).policyholder(&preferred).build();
            prop_assert_eq!(normalize_claim(&raw).policyholder.name, preferred);
        }

        #[test]
        fn any_name_source_resolves(source in name_source_strategy(), name in "[A-Z][a-z]{2,8}") {
            let claim = normalize_claim(&single(source, json!(name.clone())));
            prop_assert_eq!(claim.policyholder.name, name);
        }

        #[test]
        fn absent_values_never_win(absent in absent_value_strategy(), name in "[A-Z][a-z]{2,8}") {
            let raw = json!({"policyholder_name": absent, "insured_name": name.clone()});
            prop_assert_eq!(normalize_claim(&raw).policyholder.name, name);
        }

        #[test]
        fn wire_amounts_parse((amount, wire) in wire_amount_strategy()) {
            let claim = normalize_claim(&json!({"estimated_loss_amount": wire}));
            prop_assert_eq!(claim.loss.estimated_amount.amount(), amount);
        }

        #[test]
        fn wire_dates_parse((date, wire) in wire_date_strategy()) {
            let claim = normalize_claim(&json!({"loss_date": wire}));
            let resolved = claim.loss.date.as_datetime().map(|at| at.date_naive());
            prop_assert_eq!(resolved, Some(date));
        }
    }
}
