use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transactions_errors::TransactionError;
use super::Result;

/// Domain model representing a single dated money movement.
/// Income amounts are positive, expenses negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    pub payee: String,
    pub notes: Option<String>,
    pub transaction_date: NaiveDate,
    pub is_income: bool,
    pub account_id: String,
    pub category_id: String,
    pub recurring_transaction_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for transactions
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct TransactionDB {
    pub id: String,
    pub amount: String,
    pub payee: String,
    pub notes: Option<String>,
    pub transaction_date: NaiveDate,
    pub is_income: bool,
    pub account_id: String,
    pub category_id: String,
    pub recurring_transaction_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TransactionDB {
    pub fn amount_decimal(&self) -> Decimal {
        self.amount.parse().unwrap_or(Decimal::ZERO)
    }
}

/// Input model for creating a new transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub amount: Decimal,
    pub payee: String,
    pub notes: Option<String>,
    pub transaction_date: NaiveDate,
    pub is_income: bool,
    pub account_id: String,
    pub category_id: String,
    pub recurring_transaction_id: Option<String>,
}

impl NewTransaction {
    /// Validates the new transaction data
    pub fn validate(&self) -> Result<()> {
        if self.payee.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Payee cannot be empty".to_string(),
            ));
        }
        if self.account_id.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Account ID is required".to_string(),
            ));
        }
        if self.category_id.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Category ID is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input model for updating an existing transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub id: String,
    pub amount: Decimal,
    pub payee: String,
    pub notes: Option<String>,
    pub transaction_date: NaiveDate,
    pub is_income: bool,
    pub account_id: String,
    pub category_id: String,
}

impl TransactionUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Transaction ID is required for updates".to_string(),
            ));
        }
        if self.payee.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Payee cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Filters applied when searching transactions
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_income: Option<bool>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub search: Option<String>,
}

/// One month's totals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_amount: Decimal,
    pub transaction_count: usize,
}

/// Per-category totals over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category_id: String,
    pub category_name: String,
    pub total_amount: Decimal,
    pub transaction_count: usize,
    pub percentage: f64,
}

// Conversion implementations
impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        let amount = db.amount_decimal();
        Self {
            id: db.id,
            amount,
            payee: db.payee,
            notes: db.notes,
            transaction_date: db.transaction_date,
            is_income: db.is_income,
            account_id: db.account_id,
            category_id: db.category_id,
            recurring_transaction_id: db.recurring_transaction_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewTransaction> for TransactionDB {
    fn from(domain: NewTransaction) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            amount: domain.amount.to_string(),
            payee: domain.payee,
            notes: domain.notes,
            transaction_date: domain.transaction_date,
            is_income: domain.is_income,
            account_id: domain.account_id,
            category_id: domain.category_id,
            recurring_transaction_id: domain.recurring_transaction_id,
            created_at: now,
            updated_at: now,
        }
    }
}
