use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::schema::{categories, transactions};
use crate::transactions::{Result, TransactionError};

use super::transactions_model::{
    NewTransaction, Transaction, TransactionDB, TransactionFilter, TransactionUpdate,
};

/// Repository for managing transaction data in the database
pub struct TransactionRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a new transaction in the database
    pub fn create(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;
        Self::insert_with_conn(&mut conn, new_transaction)
    }

    /// Inserts a transaction on the caller's connection so the write can
    /// take part in a larger transaction (CSV import, transfers, sweeps).
    pub fn insert_with_conn(
        conn: &mut SqliteConnection,
        new_transaction: NewTransaction,
    ) -> Result<Transaction> {
        new_transaction.validate()?;

        let mut transaction_db: TransactionDB = new_transaction.into();
        if transaction_db.id.is_empty() {
            transaction_db.id = uuid::Uuid::new_v4().to_string();
        }

        diesel::insert_into(transactions::table)
            .values(&transaction_db)
            .execute(conn)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        Ok(transaction_db.into())
    }

    /// Updates an existing transaction
    pub fn update(&self, update: TransactionUpdate) -> Result<Transaction> {
        update.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let mut existing = transactions::table
            .find(&update.id)
            .first::<TransactionDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => TransactionError::NotFound(format!(
                    "Transaction with id {} not found",
                    update.id
                )),
                _ => TransactionError::DatabaseError(e.to_string()),
            })?;

        existing.amount = update.amount.to_string();
        existing.payee = update.payee;
        existing.notes = update.notes;
        existing.transaction_date = update.transaction_date;
        existing.is_income = update.is_income;
        existing.account_id = update.account_id;
        existing.category_id = update.category_id;
        existing.updated_at = chrono::Utc::now().naive_utc();

        diesel::update(transactions::table.find(&existing.id))
            .set(&existing)
            .execute(&mut conn)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        Ok(existing.into())
    }

    /// Retrieves a transaction by its ID
    pub fn get_by_id(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let transaction = transactions::table
            .find(transaction_id)
            .first::<TransactionDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => TransactionError::NotFound(format!(
                    "Transaction with id {} not found",
                    transaction_id
                )),
                _ => TransactionError::DatabaseError(e.to_string()),
            })?;

        Ok(transaction.into())
    }

    /// Lists transactions matching the filter, newest first.
    /// Amount-range filtering happens at the service layer since amounts
    /// are stored as TEXT.
    pub fn list(
        &self,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let mut query = transactions::table.into_boxed();

        if let Some(ref account) = filter.account_id {
            query = query.filter(transactions::account_id.eq(account.clone()));
        }
        if let Some(ref category) = filter.category_id {
            query = query.filter(transactions::category_id.eq(category.clone()));
        }
        if let Some(start) = filter.start_date {
            query = query.filter(transactions::transaction_date.ge(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(transactions::transaction_date.le(end));
        }
        if let Some(income) = filter.is_income {
            query = query.filter(transactions::is_income.eq(income));
        }
        if let Some(ref term) = filter.search {
            let pattern = format!("%{}%", term);
            query = query.filter(
                transactions::payee
                    .like(pattern.clone())
                    .or(transactions::notes.like(pattern)),
            );
        }

        query
            .order(transactions::transaction_date.desc())
            .limit(limit)
            .offset(offset)
            .load::<TransactionDB>(&mut conn)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))
            .map(|results| results.into_iter().map(Transaction::from).collect())
    }

    /// Deletes a transaction and returns the deleted record
    pub fn delete(&self, transaction_id: &str) -> Result<Transaction> {
        let transaction = self.get_by_id(transaction_id)?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        diesel::delete(transactions::table.find(transaction_id))
            .execute(&mut conn)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        Ok(transaction)
    }

    /// Checks that a category row exists
    pub fn category_exists(&self, category_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let found = categories::table
            .find(category_id)
            .select(categories::id)
            .first::<String>(&mut conn)
            .optional()
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        Ok(found.is_some())
    }
}
