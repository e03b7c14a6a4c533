//! Response envelope handling
//!
//! Some backend versions wrap payloads as `{"success": bool, "data": ...}`,
//! others return the payload bare. Callers never see the difference.

use serde_json::Value;

use crate::error::ClaimsError;

const DEFAULT_REJECTION: &str = "request was not successful";

/// Returns the payload inside an envelope, or the value itself when bare.
///
/// `success: false` becomes `ClaimsError::Rejected` carrying the server's
/// `error` or `message` text.
pub fn unwrap_envelope(payload: Value) -> Result<Value, ClaimsError> {
    let Value::Object(mut map) = payload else {
        return Ok(payload);
    };

    match map.get("success") {
        Some(Value::Bool(true)) => Ok(map.remove("data").unwrap_or(Value::Null)),
        Some(Value::Bool(false)) => {
            let message = ["error", "message"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .unwrap_or(DEFAULT_REJECTION);
            Err(ClaimsError::Rejected(message.to_string()))
        }
        _ if map.len() == 1 && map.contains_key("data") => {
            Ok(map.remove("data").unwrap_or(Value::Null))
        }
        _ => Ok(Value::Object(map)),
    }
}

/// Unwraps and requires an array payload
pub fn expect_array(payload: Value, what: &str) -> Result<Vec<Value>, ClaimsError> {
    match unwrap_envelope(payload)? {
        Value::Array(items) => Ok(items),
        other => Err(ClaimsError::decode(format!(
            "expected {} as an array, got {}",
            what,
            kind_of(&other)
        ))),
    }
}

/// Unwraps and requires an object payload
pub fn expect_object(payload: Value, what: &str) -> Result<Value, ClaimsError> {
    match unwrap_envelope(payload)? {
        object @ Value::Object(_) => Ok(object),
        other => Err(ClaimsError::decode(format!(
            "expected {} as an object, got {}",
            what,
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use serde_json::json;

    #[test]
    fn test_success_envelope_yields_data() {
        let payload = json!({"success": true, "data": [1, 2]});
        assert_eq!(unwrap_envelope(payload).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_success_without_data_is_null() {
        assert_eq!(unwrap_envelope(json!({"success": true})).unwrap(), Value::Null);
    }

    #[test]
    fn test_failure_envelope_is_rejected() {
        let err = unwrap_envelope(json!({"success": false, "error": "claim locked"})).unwrap_err();
        assert!(matches!(err, ClaimsError::Rejected(ref m) if m == "claim locked"));
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[test]
    fn test_bare_payloads_pass_through() {
        assert_eq!(unwrap_envelope(json!([{"id": 1}])).unwrap(), json!([{"id": 1}]));
        let claim = json!({"id": 1, "data": "x", "claim_number": "FL-1"});
        assert_eq!(unwrap_envelope(claim.clone()).unwrap(), claim);
    }

    #[test]
    fn test_data_only_wrapper_is_unwrapped() {
        assert_eq!(unwrap_envelope(json!({"data": {"id": 3}})).unwrap(), json!({"id": 3}));
    }

    #[test]
    fn test_expect_array_rejects_object() {
        let err = expect_array(json!({"success": true, "data": {"id": 1}}), "claims").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Decode);
        assert!(err.to_string().contains("claims"));
    }
}
