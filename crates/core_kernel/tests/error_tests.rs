//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::PortError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("Missing base url");

    match error {
        CoreError::Configuration(msg) => assert_eq!(msg, "Missing base url"),
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = MoneyError::InvalidAmount("abc".to_string());
    let core_error: CoreError = money_error.into();

    assert!(matches!(core_error, CoreError::Money(_)));
    assert!(core_error.to_string().contains("abc"));
}

#[test]
fn test_port_error_display() {
    let error = PortError::status(502, "bad gateway");
    assert_eq!(error.to_string(), "HTTP 502: bad gateway");

    let error = PortError::Timeout {
        operation: "list_attachments".to_string(),
        duration_ms: 30_000,
    };
    assert!(error.is_transient());
    assert!(error.to_string().contains("list_attachments"));
}
