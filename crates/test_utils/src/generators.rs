//! Property-Based Test Generators
//!
//! Proptest strategies producing raw wire values in the shapes the claims
//! backend has used, paired with the value they should normalize to.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

/// Whole-dollar amounts with a wire encoding: JSON number, plain string,
/// grouped string or symbol-prefixed string
pub fn wire_amount_strategy() -> impl Strategy<Value = (Decimal, Value)> {
    (0i64..100_000_000i64, 0u8..4u8).prop_map(|(dollars, encoding)| {
        let grouped = group(dollars);
        let wire = match encoding {
            0 => json!(dollars),
            1 => json!(dollars.to_string()),
            2 => json!(grouped),
            _ => json!(format!("${}", grouped)),
        };
        (Decimal::from(dollars), wire)
    })
}

/// Calendar dates between 1990 and 2040, encoded in one of the accepted formats
pub fn wire_date_strategy() -> impl Strategy<Value = (NaiveDate, String)> {
    (0i64..18_250i64, 0u8..4u8).prop_map(|(offset, encoding)| {
        let date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default() + Duration::days(offset);
        let wire = match encoding {
            0 => date.format("%Y-%m-%d").to_string(),
            1 => date.format("%m/%d/%Y").to_string(),
            2 => format!("{}T00:00:00Z", date.format("%Y-%m-%d")),
            _ => format!("{} 00:00:00", date.format("%Y-%m-%d")),
        };
        (date, wire)
    })
}

/// A wire field name carrying the policyholder name
pub fn name_source_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("policyholder_name"),
        Just("insured_name"),
        Just("insured"),
    ]
}

/// Values that must never count as present
pub fn absent_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(json!("")),
        Just(json!("   ")),
        Just(json!("\t\n")),
    ]
}

pub fn person_name_strategy() -> impl Strategy<Value = String> {
    ("[A-Z][a-z]{2,9}", "[A-Z][a-z]{2,11}").prop_map(|(first, last)| format!("{} {}", first, last))
}

pub fn claim_number_strategy() -> impl Strategy<Value = String> {
    ("[A-Z]{2}", 2000u32..2030u32, 1u32..10_000u32)
        .prop_map(|(prefix, year, seq)| format!("{}-{}-{:04}", prefix, year, seq))
}

/// Raw claims with an arbitrary subset of fields, including nulls, blanks
/// and junk of the wrong JSON type
pub fn raw_claim_strategy() -> impl Strategy<Value = Value> {
    let field = prop_oneof![
        Just("id"),
        Just("claim_number"),
        Just("claim_status"),
        Just("status"),
        Just("policyholder_name"),
        Just("insured_name"),
        Just("estimated_loss_amount"),
        Just("estimated_loss"),
        Just("loss_date"),
        Just("number_of_floors"),
        Just("activities"),
        Just("assigned_to"),
    ];
    let value = prop_oneof![
        Just(Value::Null),
        Just(json!("")),
        Just(json!(true)),
        Just(json!([])),
        Just(json!({"nested": 1})),
        any::<i32>().prop_map(|n| json!(n)),
        "[ -~]{0,12}".prop_map(Value::String),
    ];
    proptest::collection::vec((field, value), 0..10).prop_map(|entries| {
        let mut map = Map::new();
        for (name, value) in entries {
            map.insert(name.to_string(), value);
        }
        Value::Object(map)
    })
}

fn group(dollars: i64) -> String {
    let digits = dollars.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
