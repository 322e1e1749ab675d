use chrono::{Duration, Months, NaiveDate};
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::errors::{Error, Result, ValidationError};
use crate::transactions::{TransactionFilter, TransactionRepository};

use super::budgets_model::{Budget, BudgetAnalysis, BudgetPeriodSummary, BudgetUpdate, NewBudget};
use super::budgets_repository::BudgetRepository;

/// Service for managing monthly category budgets
pub struct BudgetService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl BudgetService {
    /// Creates a new BudgetService instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a budget for a category and month
    pub fn create_budget(&self, new_budget: NewBudget) -> Result<Budget> {
        let transaction_repo = TransactionRepository::new(self.pool.clone());
        if !transaction_repo.category_exists(&new_budget.category_id)? {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Category with id {} not found",
                new_budget.category_id
            ))));
        }

        let budget = BudgetRepository::new(self.pool.clone()).create(new_budget)?;
        self.refresh_spent(budget)
    }

    /// Updates a budget's name and amount
    pub fn update_budget(&self, update: BudgetUpdate) -> Result<Budget> {
        let budget = BudgetRepository::new(self.pool.clone()).update(update)?;
        self.refresh_spent(budget)
    }

    /// Retrieves a budget with its spent amount freshly recomputed
    pub fn get_budget(&self, budget_id: &str) -> Result<BudgetAnalysis> {
        let budget = BudgetRepository::new(self.pool.clone()).get_by_id(budget_id)?;
        Ok(self.refresh_spent(budget)?.into())
    }

    /// Lists budgets for an optional period, each with fresh spent figures
    pub fn list_budgets(
        &self,
        year: Option<i32>,
        month: Option<i32>,
    ) -> Result<Vec<BudgetAnalysis>> {
        let budgets = BudgetRepository::new(self.pool.clone()).list(year, month)?;
        budgets
            .into_iter()
            .map(|budget| self.refresh_spent(budget).map(BudgetAnalysis::from))
            .collect()
    }

    /// Deletes a budget
    pub fn delete_budget(&self, budget_id: &str) -> Result<()> {
        BudgetRepository::new(self.pool.clone()).delete(budget_id)?;
        Ok(())
    }

    /// Aggregates all budgets of one month into a period summary
    pub fn get_period_summary(&self, year: i32, month: i32) -> Result<BudgetPeriodSummary> {
        let budgets = self.list_budgets(Some(year), Some(month))?;

        let total_budgeted: Decimal = budgets.iter().map(|b| b.budget.amount).sum();
        let total_spent: Decimal = budgets.iter().map(|b| b.budget.spent_amount).sum();
        let over_budget_count = budgets.iter().filter(|b| b.is_over_budget).count();

        Ok(BudgetPeriodSummary {
            period_year: year,
            period_month: month,
            total_budgeted,
            total_spent,
            total_remaining: total_budgeted - total_spent,
            over_budget_count,
            budgets,
        })
    }

    /// Recomputes spent from the expense transactions recorded against the
    /// budget's category during its month, persists it, and returns the
    /// budget with the fresh figure.
    fn refresh_spent(&self, budget: Budget) -> Result<Budget> {
        let start = budget.period_start().ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "Invalid budget period {}-{:02}",
                budget.period_year, budget.period_month
            )))
        })?;
        let end = start + Months::new(1) - Duration::days(1);

        let spent = self.spent_in_period(&budget.category_id, start, end)?;

        if spent != budget.spent_amount {
            BudgetRepository::new(self.pool.clone()).set_spent_amount(&budget.id, spent)?;
        }

        Ok(Budget {
            spent_amount: spent,
            ..budget
        })
    }

    fn spent_in_period(
        &self,
        category_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Decimal> {
        let filter = TransactionFilter {
            category_id: Some(category_id.to_string()),
            start_date: Some(start),
            end_date: Some(end),
            is_income: Some(false),
            ..Default::default()
        };

        let expenses = TransactionRepository::new(self.pool.clone()).list(&filter, i64::MAX, 0)?;

        Ok(expenses.iter().map(|t| t.amount.abs()).sum())
    }
}
