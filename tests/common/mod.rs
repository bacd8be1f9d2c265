#![allow(dead_code)]

use chrono::NaiveDate;
use tempfile::TempDir;
use uuid::Uuid;

use loan_core::core::services::{LoanService, NewLoan};
use loan_core::ledger::{InterestType, LoanBook, Person};
use loan_core::storage::JsonStorage;

/// Creates an isolated storage backend in a unique directory; the guard must
/// outlive the test body.
pub fn temp_storage() -> (JsonStorage, TempDir) {
    let temp = TempDir::new().expect("create temp dir");
    let storage = JsonStorage::new(Some(temp.path().to_path_buf()), Some(3))
        .expect("create json storage backend");
    (storage, temp)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A book with one borrower and one active annual-rate loan.
pub fn book_with_annual_loan(amount: f64, rate: f64) -> (LoanBook, Uuid, Uuid) {
    let mut book = LoanBook::new("Test Book");
    let person = book.add_person(Person::new("Asha").with_city("Pune"));
    let loan = LoanService::create(
        &mut book,
        NewLoan {
            person_id: person,
            amount,
            interest_rate: rate,
            interest_type: InterestType::PerAnnum,
            start_date: date(2024, 1, 1),
            due_date: date(2025, 1, 1),
            description: None,
        },
    )
    .expect("create loan");
    (book, person, loan)
}
