use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Append-only snapshot taken at the moment a payment is recorded.
///
/// Invariant: `new_balance = balance_before + interest_for_period -
/// payment_amount`, floored at zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentHistoryEntry {
    pub deposit_date: NaiveDate,
    pub days_since_last: u32,
    pub balance_before: f64,
    pub interest_for_period: f64,
    pub total_due: f64,
    pub payment_amount: f64,
    pub new_balance: f64,
    pub cumulative_interest: f64,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A payment to record against a loan.
///
/// Callers enforce that `date` is not in the future.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl PaymentRequest {
    pub fn new(amount: f64, date: NaiveDate) -> Self {
        Self {
            amount,
            date,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One line of a reconstructed payment schedule, disbursement row included.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatementRow {
    pub date: NaiveDate,
    pub days_since_last: u32,
    pub balance_before: f64,
    pub interest_for_period: f64,
    pub total_due: f64,
    pub payment_amount: f64,
    pub new_balance: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
    pub notes: String,
}
