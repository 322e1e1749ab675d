use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::accounts::{AccountError, Result};
use crate::db::get_connection;
use crate::schema::accounts;
use crate::schema::accounts::dsl::*;
use crate::schema::transactions;

use super::accounts_model::{Account, AccountDB, AccountUpdate, NewAccount};

/// Repository for managing account data in the database
pub struct AccountRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl AccountRepository {
    /// Creates a new AccountRepository instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a new account in the database
    pub fn create(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;

        let mut account_db: AccountDB = new_account.into();
        account_db.id = uuid::Uuid::new_v4().to_string();

        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        diesel::insert_into(accounts::table)
            .values(&account_db)
            .execute(&mut conn)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        Ok(account_db.into())
    }

    /// Updates an existing account, preserving its stored balances
    pub fn update(&self, account_update: AccountUpdate) -> Result<Account> {
        account_update.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let account_id = account_update.id.clone().unwrap_or_default();
        let mut existing = accounts
            .find(&account_id)
            .first::<AccountDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    AccountError::NotFound(format!("Account with id {} not found", account_id))
                }
                _ => AccountError::DatabaseError(e.to_string()),
            })?;

        existing.name = account_update.name;
        existing.account_type = account_update.account_type;
        existing.description = account_update.description;
        existing.is_active = account_update.is_active;
        existing.updated_at = chrono::Utc::now().naive_utc();

        diesel::update(accounts.find(&account_id))
            .set(&existing)
            .execute(&mut conn)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        Ok(existing.into())
    }

    /// Retrieves an account by its ID
    pub fn get_by_id(&self, account_id: &str) -> Result<Account> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let account = accounts
            .find(account_id)
            .first::<AccountDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    AccountError::NotFound(format!("Account with id {} not found", account_id))
                }
                _ => AccountError::DatabaseError(e.to_string()),
            })?;

        Ok(account.into())
    }

    /// Retrieves an account, failing when it is missing or soft-deleted.
    /// Used by every service that must reference a live account.
    pub fn get_active(&self, account_id: &str) -> Result<Account> {
        let account = self.get_by_id(account_id)?;
        if !account.is_active {
            return Err(AccountError::NotFound(format!(
                "Account with id {} not found or inactive",
                account_id
            )));
        }
        Ok(account)
    }

    /// Lists accounts in the database, optionally filtering by active status
    pub fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let mut query = accounts::table.into_boxed();

        if let Some(active) = is_active_filter {
            query = query.filter(is_active.eq(active));
        }

        query
            .order((is_active.desc(), name.asc()))
            .load::<AccountDB>(&mut conn)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))
            .map(|results| results.into_iter().map(Account::from).collect())
    }

    /// Soft-deletes an account by flagging it inactive
    pub fn deactivate(&self, account_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let affected = diesel::update(accounts.find(account_id))
            .set((
                is_active.eq(false),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(AccountError::NotFound(format!(
                "Account with id {} not found",
                account_id
            )));
        }

        Ok(())
    }

    /// Recomputes and stores the account's current balance from its
    /// transactions: current = initial + sum(signed transaction amounts).
    pub fn recalculate_balance(&self, account_id: &str) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        Self::recalculate_balance_with_conn(&mut conn, account_id)
    }

    /// Connection-scoped variant used inside multi-statement transactions
    pub fn recalculate_balance_with_conn(
        conn: &mut SqliteConnection,
        account_id: &str,
    ) -> Result<Decimal> {
        let account = accounts
            .find(account_id)
            .first::<AccountDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    AccountError::NotFound(format!("Account with id {} not found", account_id))
                }
                _ => AccountError::DatabaseError(e.to_string()),
            })?;

        let amounts: Vec<String> = transactions::table
            .filter(transactions::account_id.eq(account_id))
            .select(transactions::amount)
            .load::<String>(conn)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        let transaction_total: Decimal = amounts
            .iter()
            .map(|a| a.parse::<Decimal>().unwrap_or(Decimal::ZERO))
            .sum();

        let balance = account.initial_balance_decimal() + transaction_total;

        diesel::update(accounts.find(account_id))
            .set((
                current_balance.eq(balance.to_string()),
                updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        Ok(balance)
    }
}
