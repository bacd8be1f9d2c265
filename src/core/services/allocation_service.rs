//! Greedy splitting of a lump deposit across outstanding loans.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::BalanceService;
use crate::interest::round2;
use crate::ledger::loan::Loan;

/// A share of a deposit assigned to one loan.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub loan_id: Uuid,
    pub amount: f64,
}

pub struct AllocationService;

impl AllocationService {
    /// Splits `deposit` across `loans`, oldest due date first.
    ///
    /// Each loan receives at most its outstanding balance as of `as_of`;
    /// allocation stops when the deposit is exhausted. Pure: recording the
    /// resulting payments is the caller's move.
    pub fn auto_allocate(loans: &[Loan], deposit: f64, as_of: NaiveDate) -> Vec<Allocation> {
        let mut ordered: Vec<&Loan> = loans.iter().collect();
        ordered.sort_by_key(|loan| loan.due_date);

        let mut remaining = deposit;
        let mut allocations = Vec::new();
        for loan in ordered {
            if remaining <= 0.0 {
                break;
            }
            let balance = BalanceService::standing_as_of(loan, as_of).balance;
            let share = round2(remaining.min(balance));
            if share > 0.0 {
                allocations.push(Allocation {
                    loan_id: loan.id,
                    amount: share,
                });
                remaining = round2(remaining - share);
            }
        }
        allocations
    }
}
