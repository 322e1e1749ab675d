use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::recurring::{RecurringError, Result};
use crate::schema::recurring_transactions;

use super::recurring_model::{
    NewRecurringTransaction, RecurringTransaction, RecurringTransactionDB,
    RecurringTransactionUpdate,
};

/// Repository for managing recurring transaction definitions
pub struct RecurringRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl RecurringRepository {
    /// Creates a new RecurringRepository instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a new recurring transaction definition
    pub fn create(&self, new_recurring: NewRecurringTransaction) -> Result<RecurringTransaction> {
        new_recurring.validate()?;

        let mut recurring_db: RecurringTransactionDB = new_recurring.into();
        recurring_db.id = uuid::Uuid::new_v4().to_string();

        let mut conn = get_connection(&self.pool)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        diesel::insert_into(recurring_transactions::table)
            .values(&recurring_db)
            .execute(&mut conn)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        RecurringTransaction::try_from(recurring_db)
    }

    /// Updates a definition. Changing the schedule (frequency or start
    /// date) resets the next occurrence back to the start date.
    pub fn update(&self, update: RecurringTransactionUpdate) -> Result<RecurringTransaction> {
        update.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        let mut existing = recurring_transactions::table
            .find(&update.id)
            .first::<RecurringTransactionDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => RecurringError::NotFound(format!(
                    "Recurring transaction with id {} not found",
                    update.id
                )),
                _ => RecurringError::DatabaseError(e.to_string()),
            })?;

        let schedule_changed = existing.frequency != update.frequency.as_str()
            || existing.start_date != update.start_date;

        existing.amount = update.amount.to_string();
        existing.description = update.description;
        existing.notes = update.notes;
        existing.frequency = update.frequency.as_str().to_string();
        existing.start_date = update.start_date;
        existing.end_date = update.end_date;
        existing.is_income = update.is_income;
        existing.account_id = update.account_id;
        existing.category_id = update.category_id;
        existing.updated_at = chrono::Utc::now().naive_utc();
        if schedule_changed {
            existing.next_occurrence_date = existing.start_date;
        }

        diesel::update(recurring_transactions::table.find(&existing.id))
            .set(&existing)
            .execute(&mut conn)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        RecurringTransaction::try_from(existing)
    }

    /// Retrieves a definition by its ID
    pub fn get_by_id(&self, recurring_id: &str) -> Result<RecurringTransaction> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        let recurring = recurring_transactions::table
            .find(recurring_id)
            .first::<RecurringTransactionDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => RecurringError::NotFound(format!(
                    "Recurring transaction with id {} not found",
                    recurring_id
                )),
                _ => RecurringError::DatabaseError(e.to_string()),
            })?;

        RecurringTransaction::try_from(recurring)
    }

    /// Lists definitions with optional filters, most imminent last occurrence first
    pub fn list(
        &self,
        is_active_filter: Option<bool>,
        account_id_filter: Option<&str>,
        category_id_filter: Option<&str>,
    ) -> Result<Vec<RecurringTransaction>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        let mut query = recurring_transactions::table.into_boxed();

        if let Some(active) = is_active_filter {
            query = query.filter(recurring_transactions::is_active.eq(active));
        }
        if let Some(account) = account_id_filter {
            query = query.filter(recurring_transactions::account_id.eq(account.to_string()));
        }
        if let Some(category) = category_id_filter {
            query = query.filter(recurring_transactions::category_id.eq(category.to_string()));
        }

        let rows = query
            .order(recurring_transactions::next_occurrence_date.desc())
            .load::<RecurringTransactionDB>(&mut conn)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(RecurringTransaction::try_from).collect()
    }

    /// Lists active definitions due on or before `today`, excluding any
    /// whose end date has passed
    pub fn list_due(&self, today: NaiveDate) -> Result<Vec<RecurringTransaction>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        let rows = recurring_transactions::table
            .filter(recurring_transactions::is_active.eq(true))
            .filter(recurring_transactions::next_occurrence_date.le(today))
            .filter(
                recurring_transactions::end_date
                    .is_null()
                    .or(recurring_transactions::end_date.gt(today)),
            )
            .order(recurring_transactions::next_occurrence_date.asc())
            .load::<RecurringTransactionDB>(&mut conn)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(RecurringTransaction::try_from).collect()
    }

    /// Lists active definitions falling due within the given window
    pub fn list_upcoming(
        &self,
        today: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<RecurringTransaction>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        let rows = recurring_transactions::table
            .filter(recurring_transactions::is_active.eq(true))
            .filter(recurring_transactions::next_occurrence_date.le(until))
            .filter(
                recurring_transactions::end_date
                    .is_null()
                    .or(recurring_transactions::end_date.gt(today)),
            )
            .order(recurring_transactions::next_occurrence_date.asc())
            .load::<RecurringTransactionDB>(&mut conn)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(RecurringTransaction::try_from).collect()
    }

    /// Soft-deletes a definition by flagging it inactive
    pub fn deactivate(&self, recurring_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        let affected = diesel::update(recurring_transactions::table.find(recurring_id))
            .set((
                recurring_transactions::is_active.eq(false),
                recurring_transactions::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(RecurringError::NotFound(format!(
                "Recurring transaction with id {} not found",
                recurring_id
            )));
        }

        Ok(())
    }

    /// Moves a definition's next occurrence forward. Runs on the caller's
    /// connection so the advance commits together with the generated
    /// transaction.
    pub fn set_next_occurrence_with_conn(
        conn: &mut SqliteConnection,
        recurring_id: &str,
        next: NaiveDate,
    ) -> Result<()> {
        diesel::update(recurring_transactions::table.find(recurring_id))
            .set((
                recurring_transactions::next_occurrence_date.eq(next),
                recurring_transactions::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
