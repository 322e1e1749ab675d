use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::{Error, Result, ValidationError};
use crate::schema::budgets;

use super::budgets_model::{Budget, BudgetDB, BudgetUpdate, NewBudget};

/// Repository for budget persistence
pub struct BudgetRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl BudgetRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a new budget. One category can carry at most one budget
    /// per month.
    pub fn create(&self, new_budget: NewBudget) -> Result<Budget> {
        new_budget.validate()?;

        let mut conn = get_connection(&self.pool)?;

        if self
            .find_duplicate(
                &mut conn,
                &new_budget.category_id,
                new_budget.period_year,
                new_budget.period_month,
            )?
            .is_some()
        {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "A budget already exists for this category in {}-{:02}",
                new_budget.period_year, new_budget.period_month
            ))));
        }

        let mut budget_db: BudgetDB = new_budget.into();
        budget_db.id = uuid::Uuid::new_v4().to_string();

        diesel::insert_into(budgets::table)
            .values(&budget_db)
            .execute(&mut conn)?;

        Ok(budget_db.into())
    }

    fn find_duplicate(
        &self,
        conn: &mut SqliteConnection,
        category_id: &str,
        year: i32,
        month: i32,
    ) -> Result<Option<BudgetDB>> {
        let existing = budgets::table
            .filter(budgets::category_id.eq(category_id))
            .filter(budgets::period_year.eq(year))
            .filter(budgets::period_month.eq(month))
            .first::<BudgetDB>(conn)
            .optional()?;
        Ok(existing)
    }

    /// Updates a budget's name and amount
    pub fn update(&self, update: BudgetUpdate) -> Result<Budget> {
        update.validate()?;

        let mut conn = get_connection(&self.pool)?;

        diesel::update(budgets::table.find(&update.id))
            .set((
                budgets::name.eq(&update.name),
                budgets::amount.eq(update.amount.to_string()),
                budgets::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        let updated = budgets::table
            .find(&update.id)
            .first::<BudgetDB>(&mut conn)?;

        Ok(updated.into())
    }

    /// Retrieves a budget by its ID
    pub fn get_by_id(&self, budget_id: &str) -> Result<Budget> {
        let mut conn = get_connection(&self.pool)?;

        let budget = budgets::table.find(budget_id).first::<BudgetDB>(&mut conn)?;

        Ok(budget.into())
    }

    /// Lists budgets, optionally narrowed to one period
    pub fn list(&self, year: Option<i32>, month: Option<i32>) -> Result<Vec<Budget>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = budgets::table.into_boxed();

        if let Some(y) = year {
            query = query.filter(budgets::period_year.eq(y));
        }
        if let Some(m) = month {
            query = query.filter(budgets::period_month.eq(m));
        }

        let rows = query
            .order((
                budgets::period_year.desc(),
                budgets::period_month.desc(),
                budgets::name.asc(),
            ))
            .load::<BudgetDB>(&mut conn)?;

        Ok(rows.into_iter().map(Budget::from).collect())
    }

    /// Persists a freshly computed spent amount
    pub fn set_spent_amount(&self, budget_id: &str, spent: Decimal) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        diesel::update(budgets::table.find(budget_id))
            .set((
                budgets::spent_amount.eq(spent.to_string()),
                budgets::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    /// Deletes a budget
    pub fn delete(&self, budget_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;

        let deleted = diesel::delete(budgets::table.find(budget_id)).execute(&mut conn)?;

        if deleted == 0 {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Budget with id {} not found",
                budget_id
            ))));
        }

        Ok(deleted)
    }
}
