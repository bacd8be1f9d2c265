//! Dashboard aggregates across a person's loans or the whole book.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::core::services::{BalanceService, ServiceError, ServiceResult};
use crate::errors::LoanError;
use crate::interest::round2;
use crate::ledger::book::LoanBook;
use crate::ledger::loan::{Loan, LoanStatus};

/// Aggregated position across a set of loans as of a reference date.
///
/// Monetary figures cover active loans only; paid and defaulted loans
/// contribute to the counts alone.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PortfolioSummary {
    pub loan_count: usize,
    pub active_loans: usize,
    pub paid_loans: usize,
    pub defaulted_loans: usize,
    /// Active loans past their due date (derived, never persisted).
    pub overdue_loans: usize,
    /// Original principal still unpaid across active loans.
    pub principal_remaining: f64,
    /// Interest accrued to date that payments have not yet covered.
    pub unpaid_interest: f64,
    /// Outstanding balances (clamped) summed across active loans.
    pub total_due: f64,
    pub total_paid: f64,
}

pub struct SummaryService;

impl SummaryService {
    pub fn person_summary(
        book: &LoanBook,
        person_id: Uuid,
        today: NaiveDate,
    ) -> ServiceResult<PortfolioSummary> {
        if book.person(person_id).is_none() {
            return Err(ServiceError::Ledger(LoanError::PersonNotFound(
                person_id.to_string(),
            )));
        }
        Ok(summarize(&book.loans_for_person(person_id), today))
    }

    pub fn book_summary(book: &LoanBook, today: NaiveDate) -> PortfolioSummary {
        summarize(&book.loans.iter().collect::<Vec<_>>(), today)
    }
}

fn summarize(loans: &[&Loan], today: NaiveDate) -> PortfolioSummary {
    let mut summary = PortfolioSummary {
        loan_count: loans.len(),
        active_loans: 0,
        paid_loans: 0,
        defaulted_loans: 0,
        overdue_loans: 0,
        principal_remaining: 0.0,
        unpaid_interest: 0.0,
        total_due: 0.0,
        total_paid: 0.0,
    };

    for loan in loans {
        match loan.status {
            LoanStatus::Paid => summary.paid_loans += 1,
            LoanStatus::Defaulted => summary.defaulted_loans += 1,
            LoanStatus::Active | LoanStatus::Overdue => {
                summary.active_loans += 1;
                if loan.is_overdue(today) {
                    summary.overdue_loans += 1;
                }

                let standing = BalanceService::standing_as_of(loan, today);
                summary.principal_remaining += loan.amount - loan.total_principal_paid;
                summary.unpaid_interest += standing.interest_accrued - loan.total_interest_paid;
                summary.total_due += standing.balance;
                summary.total_paid += standing.total_paid;
            }
        }
    }

    summary.principal_remaining = round2(summary.principal_remaining);
    summary.unpaid_interest = round2(summary.unpaid_interest);
    summary.total_due = round2(summary.total_due);
    summary.total_paid = round2(summary.total_paid);
    summary
}
