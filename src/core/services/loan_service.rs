//! Validated CRUD helpers for loans.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::errors::LoanError;
use crate::ledger::book::LoanBook;
use crate::ledger::loan::{InterestType, Loan, LoanStatus};

/// Terms for a loan to be disbursed.
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub person_id: Uuid,
    pub amount: f64,
    pub interest_rate: f64,
    pub interest_type: InterestType,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub description: Option<String>,
}

pub struct LoanService;

impl LoanService {
    /// Creates a loan for an existing person and returns its identifier.
    pub fn create(book: &mut LoanBook, new: NewLoan) -> ServiceResult<Uuid> {
        if book.person(new.person_id).is_none() {
            return Err(ServiceError::Ledger(LoanError::PersonNotFound(
                new.person_id.to_string(),
            )));
        }
        validate_terms(new.amount, new.interest_rate, new.start_date, new.due_date)?;

        let mut loan = Loan::new(
            new.person_id,
            new.amount,
            new.interest_rate,
            new.interest_type,
            new.start_date,
            new.due_date,
        );
        loan.description = new.description;
        let id = book.add_loan(loan);
        tracing::info!(loan = %id, person = %new.person_id, amount = new.amount, "loan created");
        Ok(id)
    }

    /// Updates the loan identified by `id` via the provided mutator.
    ///
    /// The mutator runs on a copy; the book is only written back once the
    /// edited terms still validate.
    pub fn update<F>(book: &mut LoanBook, id: Uuid, mutator: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut Loan),
    {
        let mut edited = Self::get(book, id)?.clone();
        mutator(&mut edited);
        validate_terms(
            edited.amount,
            edited.interest_rate,
            edited.start_date,
            edited.due_date,
        )?;
        edited.touch();

        let slot = book
            .loan_mut(id)
            .ok_or_else(|| ServiceError::Ledger(LoanError::LoanNotFound(id.to_string())))?;
        *slot = edited;
        book.touch();
        Ok(())
    }

    /// Manual status transition; no terminal state is enforced.
    pub fn set_status(book: &mut LoanBook, id: Uuid, status: LoanStatus) -> ServiceResult<()> {
        let loan = book
            .loan_mut(id)
            .ok_or_else(|| ServiceError::Ledger(LoanError::LoanNotFound(id.to_string())))?;
        let previous = loan.status;
        loan.status = status;
        loan.touch();
        book.touch();
        tracing::info!(loan = %id, from = %previous, to = %status, "loan status changed");
        Ok(())
    }

    /// Removes the loan identified by `id`, returning the removed instance.
    pub fn remove(book: &mut LoanBook, id: Uuid) -> ServiceResult<Loan> {
        book.remove_loan(id)
            .ok_or_else(|| ServiceError::Ledger(LoanError::LoanNotFound(id.to_string())))
    }

    pub fn get(book: &LoanBook, id: Uuid) -> ServiceResult<&Loan> {
        book.loan(id)
            .ok_or_else(|| ServiceError::Ledger(LoanError::LoanNotFound(id.to_string())))
    }

    pub fn list(book: &LoanBook) -> Vec<&Loan> {
        book.loans.iter().collect()
    }

    pub fn list_for_person(book: &LoanBook, person_id: Uuid) -> Vec<&Loan> {
        book.loans_for_person(person_id)
    }
}

fn validate_terms(
    amount: f64,
    interest_rate: f64,
    start_date: NaiveDate,
    due_date: NaiveDate,
) -> ServiceResult<()> {
    if amount <= 0.0 {
        return Err(ServiceError::Invalid("loan amount must be positive".into()));
    }
    if interest_rate < 0.0 {
        return Err(ServiceError::Invalid(
            "interest rate cannot be negative".into(),
        ));
    }
    if due_date <= start_date {
        return Err(ServiceError::Invalid(
            "due date must be after start date".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::person::Person;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_loan(person_id: Uuid) -> NewLoan {
        NewLoan {
            person_id,
            amount: 1000.0,
            interest_rate: 12.0,
            interest_type: InterestType::PerAnnum,
            start_date: date(2024, 1, 1),
            due_date: date(2025, 1, 1),
            description: None,
        }
    }

    #[test]
    fn create_requires_existing_person() {
        let mut book = LoanBook::new("tests");
        let err = LoanService::create(&mut book, new_loan(Uuid::new_v4()))
            .expect_err("unknown person must be rejected");
        assert!(matches!(
            err,
            ServiceError::Ledger(LoanError::PersonNotFound(_))
        ));
    }

    #[test]
    fn create_rejects_due_before_start() {
        let mut book = LoanBook::new("tests");
        let person = book.add_person(Person::new("Asha"));
        let mut terms = new_loan(person);
        terms.due_date = terms.start_date;
        let err = LoanService::create(&mut book, terms).expect_err("due date must be after start");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn update_validates_edited_terms() {
        let mut book = LoanBook::new("tests");
        let person = book.add_person(Person::new("Asha"));
        let id = LoanService::create(&mut book, new_loan(person)).unwrap();

        let err = LoanService::update(&mut book, id, |loan| loan.amount = -5.0)
            .expect_err("negative amount must be rejected");
        assert!(matches!(err, ServiceError::Invalid(_)));
        // Rejected edit leaves the stored loan untouched.
        assert_eq!(LoanService::get(&book, id).unwrap().amount, 1000.0);

        LoanService::update(&mut book, id, |loan| loan.interest_rate = 10.0).unwrap();
        assert_eq!(LoanService::get(&book, id).unwrap().interest_rate, 10.0);
    }

    #[test]
    fn paid_loans_can_be_reopened() {
        let mut book = LoanBook::new("tests");
        let person = book.add_person(Person::new("Asha"));
        let id = LoanService::create(&mut book, new_loan(person)).unwrap();

        LoanService::set_status(&mut book, id, LoanStatus::Paid).unwrap();
        LoanService::set_status(&mut book, id, LoanStatus::Active).unwrap();
        assert_eq!(LoanService::get(&book, id).unwrap().status, LoanStatus::Active);

        LoanService::set_status(&mut book, id, LoanStatus::Defaulted).unwrap();
        assert_eq!(
            LoanService::get(&book, id).unwrap().status,
            LoanStatus::Defaulted
        );
    }
}
