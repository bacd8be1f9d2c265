pub mod allocation_service;
pub mod balance_service;
pub mod loan_service;
pub mod payment_service;
pub mod person_service;
pub mod summary_service;

pub use allocation_service::{Allocation, AllocationService};
pub use balance_service::BalanceService;
pub use loan_service::{LoanService, NewLoan};
pub use payment_service::PaymentService;
pub use person_service::PersonService;
pub use summary_service::{PortfolioSummary, SummaryService};

use crate::errors::LoanError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LoanError),
    #[error("{0}")]
    Invalid(String),
}
