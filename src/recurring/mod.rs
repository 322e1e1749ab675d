// Module declarations
pub(crate) mod recurring_errors;
pub(crate) mod recurring_model;
pub(crate) mod recurring_repository;
pub(crate) mod recurring_service;

// Re-export the public interface
pub use recurring_model::{
    Frequency, NewRecurringTransaction, RecurringTransaction, RecurringTransactionDB,
    RecurringTransactionUpdate,
};
pub use recurring_repository::RecurringRepository;
pub use recurring_service::RecurringService;

// Re-export error types for convenience
pub use recurring_errors::{RecurringError, Result};
