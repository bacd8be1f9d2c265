use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for core/domain/storage layers.
#[derive(Error, Debug)]
pub enum LoanError {
    #[error("Person not found: {0}")]
    PersonNotFound(String),
    #[error("Loan not found: {0}")]
    LoanNotFound(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

pub type Result<T> = StdResult<T, LoanError>;

impl From<std::io::Error> for LoanError {
    fn from(err: std::io::Error) -> Self {
        LoanError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for LoanError {
    fn from(err: serde_json::Error) -> Self {
        LoanError::StorageError(err.to_string())
    }
}
