use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{loan::Loan, person::Person};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Per-owner document holding borrowers and their loans.
///
/// The book is the unit of persistence; the storage layer saves and loads it
/// whole, keyed by owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanBook {
    pub id: Uuid,
    pub owner: String,
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub loans: Vec<Loan>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "LoanBook::schema_version_default")]
    pub schema_version: u8,
}

impl LoanBook {
    pub fn new(owner: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            persons: Vec::new(),
            loans: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_person(&mut self, person: Person) -> Uuid {
        let id = person.id;
        self.persons.push(person);
        self.touch();
        id
    }

    pub fn add_loan(&mut self, loan: Loan) -> Uuid {
        let id = loan.id;
        self.loans.push(loan);
        self.touch();
        id
    }

    pub fn person(&self, id: Uuid) -> Option<&Person> {
        self.persons.iter().find(|person| person.id == id)
    }

    pub fn person_mut(&mut self, id: Uuid) -> Option<&mut Person> {
        self.persons.iter_mut().find(|person| person.id == id)
    }

    pub fn remove_person(&mut self, id: Uuid) -> Option<Person> {
        let index = self.persons.iter().position(|person| person.id == id)?;
        let removed = self.persons.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn loan(&self, id: Uuid) -> Option<&Loan> {
        self.loans.iter().find(|loan| loan.id == id)
    }

    pub fn loan_mut(&mut self, id: Uuid) -> Option<&mut Loan> {
        self.loans.iter_mut().find(|loan| loan.id == id)
    }

    pub fn remove_loan(&mut self, id: Uuid) -> Option<Loan> {
        let index = self.loans.iter().position(|loan| loan.id == id)?;
        let removed = self.loans.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn loans_for_person(&self, person_id: Uuid) -> Vec<&Loan> {
        self.loans
            .iter()
            .filter(|loan| loan.person_id == person_id)
            .collect()
    }

    pub fn loan_count(&self) -> usize {
        self.loans.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
