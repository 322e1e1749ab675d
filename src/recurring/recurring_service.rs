use chrono::{Duration, Local};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::{debug, error};
use std::sync::Arc;

use crate::accounts::AccountRepository;
use crate::db::get_connection;
use crate::recurring::{RecurringError, Result};
use crate::transactions::{NewTransaction, Transaction, TransactionRepository};

use super::recurring_model::{
    NewRecurringTransaction, RecurringTransaction, RecurringTransactionUpdate,
};
use super::recurring_repository::RecurringRepository;

/// Service for managing recurring transaction definitions and generating
/// their occurrences
pub struct RecurringService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl RecurringService {
    /// Creates a new RecurringService instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    fn validate_references(&self, account_id: &str, category_id: &str) -> Result<()> {
        AccountRepository::new(self.pool.clone()).get_active(account_id)?;

        let transaction_repo = TransactionRepository::new(self.pool.clone());
        if !transaction_repo.category_exists(category_id)? {
            return Err(RecurringError::InvalidData(format!(
                "Category with id {} not found",
                category_id
            )));
        }
        Ok(())
    }

    /// Creates a new recurring transaction definition. The next occurrence
    /// starts at the start date itself.
    pub fn create_recurring(
        &self,
        new_recurring: NewRecurringTransaction,
    ) -> Result<RecurringTransaction> {
        self.validate_references(&new_recurring.account_id, &new_recurring.category_id)?;
        RecurringRepository::new(self.pool.clone()).create(new_recurring)
    }

    /// Updates an existing definition
    pub fn update_recurring(
        &self,
        update: RecurringTransactionUpdate,
    ) -> Result<RecurringTransaction> {
        self.validate_references(&update.account_id, &update.category_id)?;
        RecurringRepository::new(self.pool.clone()).update(update)
    }

    /// Retrieves a definition by its ID
    pub fn get_recurring(&self, recurring_id: &str) -> Result<RecurringTransaction> {
        RecurringRepository::new(self.pool.clone()).get_by_id(recurring_id)
    }

    /// Lists definitions with optional filters
    pub fn list_recurring(
        &self,
        is_active: Option<bool>,
        account_id: Option<&str>,
        category_id: Option<&str>,
    ) -> Result<Vec<RecurringTransaction>> {
        RecurringRepository::new(self.pool.clone()).list(is_active, account_id, category_id)
    }

    /// Soft-deletes a definition
    pub fn delete_recurring(&self, recurring_id: &str) -> Result<()> {
        RecurringRepository::new(self.pool.clone()).deactivate(recurring_id)
    }

    /// Generates one occurrence for a definition: inserts a transaction
    /// dated at the current next occurrence and advances the schedule by
    /// one frequency step, atomically.
    ///
    /// Refused when the definition is inactive or its end date has passed.
    pub fn generate_occurrence(&self, recurring_id: &str) -> Result<Transaction> {
        let repo = RecurringRepository::new(self.pool.clone());
        let recurring = repo.get_by_id(recurring_id)?;

        if !recurring.is_active {
            return Err(RecurringError::Inactive(recurring_id.to_string()));
        }

        let today = Local::now().date_naive();
        if let Some(end) = recurring.end_date {
            if end < today {
                return Err(RecurringError::Ended(recurring_id.to_string()));
            }
        }

        // Income stays positive, expenses are stored negative
        let amount = if recurring.is_income {
            recurring.amount.abs()
        } else {
            -recurring.amount.abs()
        };

        let new_transaction = NewTransaction {
            id: None,
            amount,
            payee: recurring.description.clone(),
            notes: recurring.notes.clone(),
            transaction_date: recurring.next_occurrence_date,
            is_income: recurring.is_income,
            account_id: recurring.account_id.clone(),
            category_id: recurring.category_id.clone(),
            recurring_transaction_id: Some(recurring.id.clone()),
        };

        let next = recurring.frequency.advance(recurring.next_occurrence_date);

        let mut conn = get_connection(&self.pool)
            .map_err(|e| RecurringError::DatabaseError(e.to_string()))?;

        let transaction = conn.transaction::<Transaction, RecurringError, _>(|conn| {
            let created = TransactionRepository::insert_with_conn(conn, new_transaction)?;
            RecurringRepository::set_next_occurrence_with_conn(conn, &recurring.id, next)?;
            Ok(created)
        })?;

        AccountRepository::new(self.pool.clone()).recalculate_balance(&transaction.account_id)?;

        debug!(
            "Generated occurrence {} for recurring transaction {}, next due {}",
            transaction.id, recurring.id, next
        );

        Ok(transaction)
    }

    /// Generates one occurrence for every active definition whose next
    /// occurrence is due today or earlier. A failing definition is logged
    /// and skipped; the sweep keeps going. Returns the processed count.
    ///
    /// Two sweeps racing each other may double-generate a definition; the
    /// store provides no cross-request locking.
    pub fn process_due(&self) -> Result<usize> {
        let today = Local::now().date_naive();
        let due = RecurringRepository::new(self.pool.clone()).list_due(today)?;

        let mut processed = 0;
        for recurring in due {
            match self.generate_occurrence(&recurring.id) {
                Ok(_) => processed += 1,
                Err(e) => {
                    error!(
                        "Failed to process recurring transaction {}: {}",
                        recurring.id, e
                    );
                }
            }
        }

        Ok(processed)
    }

    /// Lists active definitions falling due within the next `days_ahead` days
    pub fn get_upcoming(&self, days_ahead: i64) -> Result<Vec<RecurringTransaction>> {
        let today = Local::now().date_naive();
        let until = today + Duration::days(days_ahead);
        RecurringRepository::new(self.pool.clone()).list_upcoming(today, until)
    }
}
