//! Balance and accrual views over a loan's payment history.

use chrono::NaiveDate;

use crate::interest::{day_count, interest_for, round2};
use crate::ledger::loan::{Loan, LoanStanding};
use crate::ledger::payment::{PaymentHistoryEntry, PaymentRequest, StatementRow};

const DISBURSEMENT_NOTE: &str = "Loan Disbursed";

/// Read-only reconstruction of what a loan owes at any date.
pub struct BalanceService;

impl BalanceService {
    /// Outstanding amounts as of `as_of`, derived from the recorded history.
    ///
    /// Dates on or before the latest qualifying entry return that entry's
    /// snapshot unchanged; later dates accrue additional interest on the
    /// entry's closing balance.
    pub fn standing_as_of(loan: &Loan, as_of: NaiveDate) -> LoanStanding {
        let principal = round2(loan.amount);

        if as_of < loan.start_date {
            return LoanStanding {
                principal,
                interest_accrued: 0.0,
                total_amount: principal,
                total_paid: 0.0,
                balance: principal,
                raw_balance: principal,
                is_overpaid: false,
            };
        }

        let mut entries: Vec<&PaymentHistoryEntry> = loan
            .payment_history
            .iter()
            .filter(|entry| entry.deposit_date <= as_of)
            .collect();
        entries.sort_by_key(|entry| entry.deposit_date);

        let Some(last) = entries.last() else {
            let days = day_count(loan.start_date, as_of);
            let accrued = interest_for(loan.amount, loan.interest_rate, days, loan.interest_type);
            let total = round2(loan.amount + accrued);
            return LoanStanding {
                principal,
                interest_accrued: accrued,
                total_amount: total,
                total_paid: 0.0,
                balance: total,
                raw_balance: total,
                is_overpaid: false,
            };
        };

        let total_paid = round2(entries.iter().map(|entry| entry.payment_amount).sum());

        if as_of <= last.deposit_date {
            let raw = round2(last.new_balance);
            return LoanStanding {
                principal,
                interest_accrued: round2(last.cumulative_interest),
                total_amount: round2(loan.amount + last.cumulative_interest),
                total_paid,
                balance: raw.max(0.0),
                raw_balance: raw,
                is_overpaid: raw < 0.0,
            };
        }

        let gap = day_count(last.deposit_date, as_of);
        let additional = interest_for(last.new_balance, loan.interest_rate, gap, loan.interest_type);
        let accrued = round2(last.cumulative_interest + additional);
        let raw = round2(last.new_balance + additional);
        LoanStanding {
            principal,
            interest_accrued: accrued,
            total_amount: round2(loan.amount + accrued),
            total_paid,
            balance: raw.max(0.0),
            raw_balance: raw,
            is_overpaid: raw < 0.0,
        }
    }

    /// Interest accrued on the original principal from start to `on`.
    pub fn accrued_interest(loan: &Loan, on: NaiveDate) -> f64 {
        let days = day_count(loan.start_date, on);
        if days == 0 {
            return 0.0;
        }
        interest_for(loan.amount, loan.interest_rate, days, loan.interest_type)
    }

    /// Principal plus interest accrued from start to `on`.
    pub fn current_total(loan: &Loan, on: NaiveDate) -> f64 {
        round2(loan.amount + Self::accrued_interest(loan, on))
    }

    /// Principal plus the interest the full start-to-due term accrues.
    pub fn total_at_due(loan: &Loan) -> f64 {
        let days = day_count(loan.start_date, loan.due_date);
        round2(loan.amount + interest_for(loan.amount, loan.interest_rate, days, loan.interest_type))
    }

    /// Display rows for the recorded history, led by the disbursement row.
    pub fn statement(loan: &Loan) -> Vec<StatementRow> {
        let mut rows = vec![Self::disbursement_row(loan)];
        let mut cumulative_principal = 0.0;
        for entry in &loan.payment_history {
            let principal_portion = (entry.payment_amount - entry.interest_for_period).max(0.0);
            cumulative_principal = round2(cumulative_principal + principal_portion);
            rows.push(StatementRow {
                date: entry.deposit_date,
                days_since_last: entry.days_since_last,
                balance_before: entry.balance_before,
                interest_for_period: entry.interest_for_period,
                total_due: entry.total_due,
                payment_amount: entry.payment_amount,
                new_balance: entry.new_balance,
                cumulative_interest: entry.cumulative_interest,
                cumulative_principal,
                notes: entry.notes.clone(),
            });
        }
        rows
    }

    /// Rebuilds the full running-balance schedule from a raw payment list.
    ///
    /// Audit companion to [`Self::statement`]: recomputes every period from
    /// the loan terms instead of trusting recorded snapshots.
    pub fn rebuild(loan: &Loan, payments: &[PaymentRequest]) -> Vec<StatementRow> {
        let mut rows = vec![Self::disbursement_row(loan)];

        let mut sorted: Vec<&PaymentRequest> = payments.iter().collect();
        sorted.sort_by_key(|payment| payment.date);

        let mut current_balance = loan.amount;
        let mut last_date = loan.start_date;
        let mut cumulative_interest = 0.0;
        let mut cumulative_principal = 0.0;

        for payment in sorted {
            let days = day_count(last_date, payment.date);
            let interest =
                interest_for(current_balance, loan.interest_rate, days, loan.interest_type);
            let total_due = round2(current_balance + interest);
            let balance_before = round2(current_balance);
            let new_balance = round2(total_due - payment.amount);

            let interest_paid = round2(payment.amount.min(interest));
            let principal_paid = round2((payment.amount - interest).max(0.0));
            cumulative_interest = round2(cumulative_interest + interest_paid);
            cumulative_principal = round2(cumulative_principal + principal_paid);

            let notes = match payment.description.as_deref() {
                Some(text) if !text.is_empty() => text.to_string(),
                _ if payment.amount >= total_due => "Full Payment".to_string(),
                _ => "Partial Payment".to_string(),
            };

            rows.push(StatementRow {
                date: payment.date,
                days_since_last: days,
                balance_before,
                interest_for_period: interest,
                total_due,
                payment_amount: round2(payment.amount),
                new_balance: new_balance.max(0.0),
                cumulative_interest,
                cumulative_principal,
                notes,
            });

            current_balance = new_balance.max(0.0);
            last_date = payment.date;
        }

        rows
    }

    fn disbursement_row(loan: &Loan) -> StatementRow {
        StatementRow {
            date: loan.start_date,
            days_since_last: 0,
            balance_before: 0.0,
            interest_for_period: 0.0,
            total_due: round2(loan.amount),
            payment_amount: 0.0,
            new_balance: round2(loan.amount),
            cumulative_interest: 0.0,
            cumulative_principal: 0.0,
            notes: DISBURSEMENT_NOTE.into(),
        }
    }
}
