//! Borrower management.

use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::errors::LoanError;
use crate::ledger::book::LoanBook;
use crate::ledger::person::Person;

pub struct PersonService;

impl PersonService {
    pub fn create(book: &mut LoanBook, person: Person) -> ServiceResult<Uuid> {
        if person.name.trim().is_empty() {
            return Err(ServiceError::Invalid("person name is required".into()));
        }
        let id = book.add_person(person);
        tracing::info!(person = %id, "person added");
        Ok(id)
    }

    /// Edits a person via the provided mutator; written back only when the
    /// edited record still validates.
    pub fn update<F>(book: &mut LoanBook, id: Uuid, mutator: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut Person),
    {
        let mut edited = Self::get(book, id)?.clone();
        mutator(&mut edited);
        if edited.name.trim().is_empty() {
            return Err(ServiceError::Invalid("person name is required".into()));
        }

        let slot = book
            .person_mut(id)
            .ok_or_else(|| ServiceError::Ledger(LoanError::PersonNotFound(id.to_string())))?;
        *slot = edited;
        book.touch();
        Ok(())
    }

    /// Removes a person; refused while loans still reference them.
    pub fn remove(book: &mut LoanBook, id: Uuid) -> ServiceResult<Person> {
        if !book.loans_for_person(id).is_empty() {
            return Err(ServiceError::Invalid(
                "person still has loans on the book".into(),
            ));
        }
        book.remove_person(id)
            .ok_or_else(|| ServiceError::Ledger(LoanError::PersonNotFound(id.to_string())))
    }

    pub fn get(book: &LoanBook, id: Uuid) -> ServiceResult<&Person> {
        book.person(id)
            .ok_or_else(|| ServiceError::Ledger(LoanError::PersonNotFound(id.to_string())))
    }

    pub fn list(book: &LoanBook) -> Vec<&Person> {
        book.persons.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::loan::{InterestType, Loan};
    use chrono::NaiveDate;

    #[test]
    fn blank_names_are_rejected() {
        let mut book = LoanBook::new("tests");
        let err = PersonService::create(&mut book, Person::new("  "))
            .expect_err("blank name must be rejected");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn removal_is_refused_while_loans_remain() {
        let mut book = LoanBook::new("tests");
        let person = PersonService::create(&mut book, Person::new("Asha")).unwrap();
        book.add_loan(Loan::new(
            person,
            100.0,
            5.0,
            InterestType::PerAnnum,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ));

        let err =
            PersonService::remove(&mut book, person).expect_err("person with loans must stay");
        assert!(matches!(err, ServiceError::Invalid(_)));

        let loan_id = book.loans[0].id;
        book.remove_loan(loan_id);
        let removed = PersonService::remove(&mut book, person).unwrap();
        assert_eq!(removed.id, person);
    }
}
