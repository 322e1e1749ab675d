// Module declarations
pub(crate) mod budgets_model;
pub(crate) mod budgets_repository;
pub(crate) mod budgets_service;

// Re-export the public interface
pub use budgets_model::{
    Budget, BudgetAnalysis, BudgetDB, BudgetPeriodSummary, BudgetUpdate, NewBudget,
};
pub use budgets_repository::BudgetRepository;
pub use budgets_service::BudgetService;
