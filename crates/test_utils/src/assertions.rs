//! Custom Test Assertions
//!
//! Assertion helpers for dashboard state that give more useful failure
//! messages than a bare `assert!`.

use std::fmt::Debug;

use domain_claims::{Claim, FailureKind, LoadPhase, Outcome, ValidationError, ViewState};

/// Asserts that no field of the detail view renders blank
pub fn assert_fully_rendered(claim: &Claim) {
    for (label, value) in claim.display_fields() {
        assert!(
            !value.trim().is_empty(),
            "{} rendered blank for claim {}",
            label,
            claim.claim_number
        );
    }
}

/// Unwraps a completed outcome, panicking with the notice otherwise
pub fn assert_completed<T: Debug>(outcome: Outcome<T>) -> T {
    match outcome {
        Outcome::Completed(value) => value,
        other => panic!("Expected completed outcome, got {:?}", other),
    }
}

/// Asserts that an outcome failed with the given kind, returning its message
pub fn assert_failed<T: Debug>(outcome: Outcome<T>, kind: FailureKind) -> String {
    match outcome {
        Outcome::Failed(notice) => {
            assert_eq!(notice.kind, kind, "Unexpected failure kind: {}", notice);
            notice.message
        }
        other => panic!("Expected failed outcome, got {:?}", other),
    }
}

/// Asserts that an outcome was rejected for the given reason
pub fn assert_rejected<T: Debug>(outcome: Outcome<T>, expected: ValidationError) {
    match outcome {
        Outcome::Rejected(reason) => assert_eq!(reason, expected),
        other => panic!("Expected rejected outcome, got {:?}", other),
    }
}

/// Asserts that a view state settled and is not stuck loading
pub fn assert_settled<T: Debug>(view: &ViewState<T>) {
    assert!(
        matches!(view.phase, LoadPhase::Ready | LoadPhase::Failed),
        "View did not settle: {:?}",
        view
    );
}
