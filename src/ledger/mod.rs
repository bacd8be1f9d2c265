pub mod book;
pub mod loan;
pub mod payment;
pub mod person;

pub use book::LoanBook;
pub use loan::{InterestType, Loan, LoanStanding, LoanStatus};
pub use payment::{PaymentHistoryEntry, PaymentRequest, StatementRow};
pub use person::Person;
