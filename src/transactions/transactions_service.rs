use chrono::{Duration, Months, NaiveDate};
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;
use std::sync::Arc;

use crate::accounts::AccountRepository;
use crate::categories::CategoryRepository;
use crate::transactions::{Result, TransactionError};

use super::transactions_model::{
    CategorySummary, MonthlySummary, NewTransaction, Transaction, TransactionFilter,
    TransactionUpdate,
};
use super::transactions_repository::TransactionRepository;

/// Service for managing transactions
pub struct TransactionService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl TransactionService {
    /// Creates a new TransactionService instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    fn validate_references(&self, account_id: &str, category_id: &str) -> Result<()> {
        let account_repo = AccountRepository::new(self.pool.clone());
        account_repo.get_active(account_id)?;

        let transaction_repo = TransactionRepository::new(self.pool.clone());
        if !transaction_repo.category_exists(category_id)? {
            return Err(TransactionError::InvalidData(format!(
                "Category with id {} not found",
                category_id
            )));
        }
        Ok(())
    }

    /// Creates a new transaction and refreshes the owning account's balance
    pub fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        self.validate_references(&new_transaction.account_id, &new_transaction.category_id)?;

        let repo = TransactionRepository::new(self.pool.clone());
        let transaction = repo.create(new_transaction)?;

        AccountRepository::new(self.pool.clone()).recalculate_balance(&transaction.account_id)?;

        Ok(transaction)
    }

    /// Updates an existing transaction, refreshing every affected account
    pub fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction> {
        self.validate_references(&update.account_id, &update.category_id)?;

        let repo = TransactionRepository::new(self.pool.clone());
        let previous = repo.get_by_id(&update.id)?;
        let updated = repo.update(update)?;

        let account_repo = AccountRepository::new(self.pool.clone());
        account_repo.recalculate_balance(&previous.account_id)?;
        if updated.account_id != previous.account_id {
            account_repo.recalculate_balance(&updated.account_id)?;
        }

        Ok(updated)
    }

    /// Deletes a transaction and refreshes the owning account's balance
    pub fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let repo = TransactionRepository::new(self.pool.clone());
        let deleted = repo.delete(transaction_id)?;

        AccountRepository::new(self.pool.clone()).recalculate_balance(&deleted.account_id)?;

        Ok(deleted)
    }

    /// Retrieves a transaction by its ID
    pub fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        TransactionRepository::new(self.pool.clone()).get_by_id(transaction_id)
    }

    /// Lists transactions matching the filter, newest first
    pub fn search_transactions(
        &self,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>> {
        let repo = TransactionRepository::new(self.pool.clone());
        let mut results = repo.list(filter, limit, offset)?;

        if let Some(min) = filter.min_amount {
            results.retain(|t| t.amount >= min);
        }
        if let Some(max) = filter.max_amount {
            results.retain(|t| t.amount <= max);
        }

        Ok(results)
    }

    /// Totals for one calendar month, optionally scoped to one account
    pub fn get_monthly_summary(
        &self,
        year: i32,
        month: u32,
        account_id: Option<String>,
    ) -> Result<MonthlySummary> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            TransactionError::InvalidData(format!("Invalid period {}-{:02}", year, month))
        })?;
        let end = start + Months::new(1) - Duration::days(1);

        let filter = TransactionFilter {
            account_id,
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        };

        let repo = TransactionRepository::new(self.pool.clone());
        let transactions = repo.list(&filter, i64::MAX, 0)?;

        let total_income: Decimal = transactions
            .iter()
            .filter(|t| t.is_income)
            .map(|t| t.amount)
            .sum();
        let total_expenses: Decimal = transactions
            .iter()
            .filter(|t| !t.is_income)
            .map(|t| t.amount.abs())
            .sum();

        Ok(MonthlySummary {
            year,
            month,
            total_income,
            total_expenses,
            net_amount: total_income - total_expenses,
            transaction_count: transactions.len(),
        })
    }

    /// Per-category totals over an optional date range, largest first
    pub fn get_category_summary(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        account_id: Option<String>,
    ) -> Result<Vec<CategorySummary>> {
        let filter = TransactionFilter {
            account_id,
            start_date,
            end_date,
            ..Default::default()
        };

        let repo = TransactionRepository::new(self.pool.clone());
        let transactions = repo.list(&filter, i64::MAX, 0)?;

        let category_names: HashMap<String, String> = CategoryRepository::new(self.pool.clone())
            .get_all()
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut grouped: HashMap<String, (Decimal, usize)> = HashMap::new();
        for transaction in &transactions {
            let entry = grouped
                .entry(transaction.category_id.clone())
                .or_insert((Decimal::ZERO, 0));
            entry.0 += transaction.amount;
            entry.1 += 1;
        }

        let grand_total: Decimal = grouped.values().map(|(total, _)| total.abs()).sum();

        let mut summary: Vec<CategorySummary> = grouped
            .into_iter()
            .map(|(cat_id, (total_amount, transaction_count))| {
                let percentage = if grand_total > Decimal::ZERO {
                    (total_amount.abs() / grand_total * Decimal::ONE_HUNDRED)
                        .to_f64()
                        .unwrap_or(0.0)
                } else {
                    0.0
                };
                CategorySummary {
                    category_name: category_names
                        .get(&cat_id)
                        .cloned()
                        .unwrap_or_else(|| cat_id.clone()),
                    category_id: cat_id,
                    total_amount,
                    transaction_count,
                    percentage,
                }
            })
            .collect();

        summary.sort_by(|a, b| b.total_amount.abs().cmp(&a.total_amount.abs()));
        Ok(summary)
    }
}
