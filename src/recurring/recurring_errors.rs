use diesel::result::Error as DieselError;
use thiserror::Error;

use crate::accounts::AccountError;
use crate::transactions::TransactionError;

/// Custom error type for recurring-transaction operations
#[derive(Debug, Error)]
pub enum RecurringError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Recurring transaction {0} is inactive")]
    Inactive(String),
    #[error("Recurring transaction {0} has ended")]
    Ended(String),
}

impl From<DieselError> for RecurringError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => RecurringError::NotFound("Record not found".to_string()),
            _ => RecurringError::DatabaseError(err.to_string()),
        }
    }
}

impl From<AccountError> for RecurringError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(msg) | AccountError::InvalidData(msg) => {
                RecurringError::InvalidData(msg)
            }
            AccountError::DatabaseError(msg) => RecurringError::DatabaseError(msg),
        }
    }
}

impl From<TransactionError> for RecurringError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::NotFound(msg) | TransactionError::InvalidData(msg) => {
                RecurringError::InvalidData(msg)
            }
            TransactionError::DatabaseError(msg) => RecurringError::DatabaseError(msg),
        }
    }
}

/// Result type for recurring-transaction operations
pub type Result<T> = std::result::Result<T, RecurringError>;
