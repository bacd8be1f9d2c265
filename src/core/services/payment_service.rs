//! Records payments against loans and keeps their running aggregates in sync.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::core::services::{AllocationService, ServiceError, ServiceResult};
use crate::errors::LoanError;
use crate::interest::{day_count, interest_for, round2};
use crate::ledger::book::LoanBook;
use crate::ledger::loan::{Loan, LoanStatus};
use crate::ledger::payment::{PaymentHistoryEntry, PaymentRequest};

pub struct PaymentService;

impl PaymentService {
    /// Records a payment against the loan identified by `loan_id`.
    ///
    /// One read-modify-write against the in-memory book: accrues interest for
    /// the elapsed period, splits the payment between interest and principal,
    /// appends the history snapshot, and updates the running aggregates.
    /// Callers serialize writes per book.
    pub fn record(
        book: &mut LoanBook,
        loan_id: Uuid,
        request: PaymentRequest,
    ) -> ServiceResult<PaymentHistoryEntry> {
        if request.amount <= 0.0 {
            return Err(ServiceError::Invalid(
                "payment amount must be positive".into(),
            ));
        }
        let loan = book
            .loan_mut(loan_id)
            .ok_or_else(|| ServiceError::Ledger(LoanError::LoanNotFound(loan_id.to_string())))?;

        let entry = Self::apply(loan, &request);
        tracing::info!(
            loan = %loan_id,
            amount = request.amount,
            new_balance = entry.new_balance,
            "payment recorded"
        );
        book.touch();
        Ok(entry)
    }

    /// Splits a lump deposit across a person's active loans and records one
    /// payment per funded loan, oldest due date first.
    pub fn apply_deposit(
        book: &mut LoanBook,
        person_id: Uuid,
        deposit: f64,
        date: NaiveDate,
        description: Option<String>,
    ) -> ServiceResult<Vec<(Uuid, PaymentHistoryEntry)>> {
        if deposit <= 0.0 {
            return Err(ServiceError::Invalid(
                "deposit amount must be positive".into(),
            ));
        }
        if book.person(person_id).is_none() {
            return Err(ServiceError::Ledger(LoanError::PersonNotFound(
                person_id.to_string(),
            )));
        }

        let active: Vec<Loan> = book
            .loans_for_person(person_id)
            .into_iter()
            .filter(|loan| loan.status == LoanStatus::Active)
            .cloned()
            .collect();
        let allocations = AllocationService::auto_allocate(&active, deposit, date);

        let mut recorded = Vec::with_capacity(allocations.len());
        for allocation in allocations {
            let mut request = PaymentRequest::new(allocation.amount, date);
            request.description = description.clone();
            let entry = Self::record(book, allocation.loan_id, request)?;
            recorded.push((allocation.loan_id, entry));
        }
        Ok(recorded)
    }

    /// Core of the payment maths; operates on an already-validated request.
    fn apply(loan: &mut Loan, request: &PaymentRequest) -> PaymentHistoryEntry {
        let days = day_count(loan.last_payment_date, request.date);
        let interest_for_period = interest_for(
            loan.current_balance,
            loan.interest_rate,
            days,
            loan.interest_type,
        );

        let total_due = round2(loan.current_balance + interest_for_period);
        let new_balance = round2((total_due - request.amount).max(0.0));

        let interest_paid = round2(request.amount.min(interest_for_period));
        let principal_paid = round2((request.amount - interest_for_period).max(0.0));

        let notes = match request.description.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ if request.amount >= total_due => "Full Payment".to_string(),
            _ => "Partial Payment".to_string(),
        };

        let entry = PaymentHistoryEntry {
            deposit_date: request.date,
            days_since_last: days,
            balance_before: round2(loan.current_balance),
            interest_for_period,
            total_due,
            payment_amount: round2(request.amount),
            new_balance,
            cumulative_interest: round2(loan.total_interest_paid + interest_paid),
            notes,
            description: request.description.clone(),
            created_at: Utc::now(),
        };

        loan.current_balance = new_balance;
        loan.total_interest_paid = round2(loan.total_interest_paid + interest_paid);
        loan.total_principal_paid = round2(loan.total_principal_paid + principal_paid);
        loan.last_payment_date = request.date;
        if new_balance <= 0.0 {
            loan.status = LoanStatus::Paid;
        }
        loan.payment_history.push(entry.clone());
        loan.touch();

        entry
    }
}
