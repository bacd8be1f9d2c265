use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payment::PaymentHistoryEntry;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InterestType {
    PerAnnum,
    PerMonth,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Paid,
    Overdue,
    Defaulted,
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::Active => "Active",
            LoanStatus::Paid => "Paid",
            LoanStatus::Overdue => "Overdue",
            LoanStatus::Defaulted => "Defaulted",
        };
        f.write_str(label)
    }
}

/// A simple-interest loan with its embedded payment history.
///
/// `current_balance`, `total_interest_paid`, `total_principal_paid`, and
/// `last_payment_date` are running aggregates derived from `payment_history`
/// and updated together on every recorded payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: Uuid,
    pub person_id: Uuid,
    /// Original principal.
    pub amount: f64,
    /// Percentage rate, scoped by `interest_type`.
    pub interest_rate: f64,
    pub interest_type: InterestType,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: LoanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub current_balance: f64,
    pub total_interest_paid: f64,
    pub total_principal_paid: f64,
    pub last_payment_date: NaiveDate,
    #[serde(default)]
    pub payment_history: Vec<PaymentHistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    pub fn new(
        person_id: Uuid,
        amount: f64,
        interest_rate: f64,
        interest_type: InterestType,
        start_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            person_id,
            amount,
            interest_rate,
            interest_type,
            start_date,
            due_date,
            status: LoanStatus::Active,
            description: None,
            current_balance: amount,
            total_interest_paid: 0.0,
            total_principal_paid: 0.0,
            last_payment_date: start_date,
            payment_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Overdue is derived, never persisted: past due and still active.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_date && self.status == LoanStatus::Active
    }

    pub fn is_fully_paid(&self) -> bool {
        self.current_balance <= 0.0
    }

    /// Number of recorded payments with a positive amount.
    pub fn payment_count(&self) -> usize {
        self.payment_history
            .iter()
            .filter(|entry| entry.payment_amount > 0.0)
            .count()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Point-in-time view of what a loan is worth.
///
/// `balance` is clamped at zero for display; `raw_balance` keeps the signed
/// value so overpayments stay visible alongside `is_overpaid`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanStanding {
    pub principal: f64,
    pub interest_accrued: f64,
    pub total_amount: f64,
    pub total_paid: f64,
    pub balance: f64,
    pub raw_balance: f64,
    pub is_overpaid: bool,
}
