use thiserror::Error;

/// Batch-level import failures. Row-level problems are reported inside
/// the import response instead, so the rest of the batch can proceed.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Account with id {0} not found or inactive")]
    AccountNotFound(String),
    #[error("Category with id {0} not found")]
    CategoryNotFound(String),
    #[error("Import failed: {0}")]
    DatabaseError(String),
}
