//! Money types with precise decimal arithmetic
//!
//! Amounts arrive from the claims API as JSON numbers or as loosely formatted
//! strings ("50000", "$1,234.50"). This module parses them into `Money`
//! backed by rust_decimal and renders them the way the dashboard shows them:
//! en-US grouping, whole dollars, no cents.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Symbol every amount is rendered with
pub const USD_SYMBOL: &str = "$";

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// A US dollar amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    amount: Decimal,
}

impl Money {
    /// Creates a USD amount, kept to four decimal places
    pub fn usd(amount: Decimal) -> Self {
        Self {
            amount: amount.round_dp(4),
        }
    }

    pub fn zero() -> Self {
        Self { amount: dec!(0) }
    }

    /// Parses a loosely formatted amount such as `"50000"`, `"1,234.50"`
    /// or `"$ 1,234"`.
    pub fn parse(raw: &str) -> Result<Self, MoneyError> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ',' | ' ' | '_'))
            .collect();
        let (negative, digits) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };
        let digits = digits.strip_prefix(USD_SYMBOL).unwrap_or(digits);

        let amount = Decimal::from_str(digits)
            .or_else(|_| Decimal::from_scientific(digits))
            .map_err(|_| MoneyError::InvalidAmount(raw.to_string()))?;

        Ok(Self::usd(if negative { -amount } else { amount }))
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Formats as whole units with en-US digit grouping, e.g. `$1,234,567`.
    ///
    /// Half-units round away from zero. Anything that rounds to zero renders
    /// without a sign.
    pub fn format_whole(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_zero() {
            return format!("{}0", USD_SYMBOL);
        }

        let digits = rounded.abs().trunc().normalize().to_string();
        let sign = if rounded.is_sign_negative() { "-" } else { "" };
        format!("{}{}{}", sign, USD_SYMBOL, group_thousands(&digits))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_whole())
    }
}

/// Formats an optional USD amount the way every dashboard total is shown.
///
/// An absent amount renders exactly like zero: `"$0"`.
pub fn format_currency(amount: Option<Decimal>) -> String {
    Money::usd(amount.unwrap_or_default()).format_whole()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
