//! Aggregate claim statistics

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::Money;

/// Server-computed totals; the client only displays them
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClaimsStats {
    pub total_claims: u64,
    pub total_estimated_loss: Money,
    /// Zero when the backend does not report it
    pub total_paid: Money,
    /// Zero when the backend does not report it
    pub avg_days_to_close: Decimal,
}

impl ClaimsStats {
    pub fn total_estimated_loss_display(&self) -> String {
        self.total_estimated_loss.format_whole()
    }

    pub fn total_paid_display(&self) -> String {
        self.total_paid.format_whole()
    }

    pub fn avg_days_display(&self) -> String {
        self.avg_days_to_close.round_dp(1).normalize().to_string()
    }
}
