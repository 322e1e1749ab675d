use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::accounts_model::{Account, AccountTypeSummary, AccountUpdate, AccountsSummary, NewAccount};
use super::accounts_repository::AccountRepository;
use crate::accounts::Result;

/// Service for managing accounts
pub struct AccountService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl AccountService {
    /// Creates a new AccountService instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a new account
    pub fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        debug!("Creating account '{}'", new_account.name);
        let repo = AccountRepository::new(self.pool.clone());
        repo.create(new_account)
    }

    /// Updates an existing account and refreshes its balance
    pub fn update_account(&self, account_update: AccountUpdate) -> Result<Account> {
        let repo = AccountRepository::new(self.pool.clone());
        let account = repo.update(account_update)?;
        repo.recalculate_balance(&account.id)?;
        repo.get_by_id(&account.id)
    }

    /// Retrieves an account by its ID with an up-to-date balance
    pub fn get_account(&self, account_id: &str) -> Result<Account> {
        let repo = AccountRepository::new(self.pool.clone());
        repo.recalculate_balance(account_id)?;
        repo.get_by_id(account_id)
    }

    /// Lists active accounts with up-to-date balances
    pub fn get_active_accounts(&self) -> Result<Vec<Account>> {
        let repo = AccountRepository::new(self.pool.clone());
        let accounts = repo.list(Some(true))?;
        for account in &accounts {
            repo.recalculate_balance(&account.id)?;
        }
        repo.list(Some(true))
    }

    /// Lists all accounts, active or not
    pub fn get_all_accounts(&self) -> Result<Vec<Account>> {
        let repo = AccountRepository::new(self.pool.clone());
        repo.list(None)
    }

    /// Soft-deletes an account by its ID
    pub fn delete_account(&self, account_id: &str) -> Result<()> {
        let repo = AccountRepository::new(self.pool.clone());
        repo.deactivate(account_id)
    }

    /// Returns the current balance for an active account
    pub fn get_account_balance(&self, account_id: &str) -> Result<Decimal> {
        let repo = AccountRepository::new(self.pool.clone());
        repo.get_active(account_id)?;
        repo.recalculate_balance(account_id)
    }

    /// Summarizes active accounts grouped by account type
    pub fn get_accounts_summary(&self) -> Result<AccountsSummary> {
        let accounts = self.get_active_accounts()?;

        let mut summary = AccountsSummary {
            total_accounts: accounts.len(),
            total_balance: accounts.iter().map(|a| a.current_balance).sum(),
            ..Default::default()
        };

        for account in accounts {
            let slot = summary
                .by_type
                .entry(account.account_type.clone())
                .or_insert_with(AccountTypeSummary::default);
            slot.count += 1;
            slot.total_balance += account.current_balance;
        }

        Ok(summary)
    }
}
