use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::accounts_constants::ACCOUNT_TYPES;
use super::accounts_errors::AccountError;
use super::Result;

/// Domain model representing an account in the system
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub account_type: String,
    pub initial_balance: Decimal,
    pub current_balance: Decimal,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub account_type: String,
    pub initial_balance: Decimal,
    pub description: Option<String>,
}

impl NewAccount {
    /// Validates the new account data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AccountError::InvalidData(
                "Account name cannot be empty".to_string(),
            ));
        }
        if !ACCOUNT_TYPES.contains(&self.account_type.as_str()) {
            return Err(AccountError::InvalidData(format!(
                "Unknown account type '{}'",
                self.account_type
            )));
        }
        Ok(())
    }
}

/// Input model for updating an existing account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub id: Option<String>,
    pub name: String,
    pub account_type: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl AccountUpdate {
    /// Validates the account update data
    pub fn validate(&self) -> Result<()> {
        if self.id.is_none() {
            return Err(AccountError::InvalidData(
                "Account ID is required for updates".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(AccountError::InvalidData(
                "Account name cannot be empty".to_string(),
            ));
        }
        if !ACCOUNT_TYPES.contains(&self.account_type.as_str()) {
            return Err(AccountError::InvalidData(format!(
                "Unknown account type '{}'",
                self.account_type
            )));
        }
        Ok(())
    }
}

/// Database model for accounts. Balances are stored as TEXT and parsed
/// into `Decimal` at the model boundary.
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
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct AccountDB {
    pub id: String,
    pub name: String,
    pub account_type: String,
    pub initial_balance: String,
    pub current_balance: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl AccountDB {
    pub fn initial_balance_decimal(&self) -> Decimal {
        self.initial_balance.parse().unwrap_or(Decimal::ZERO)
    }

    pub fn current_balance_decimal(&self) -> Decimal {
        self.current_balance.parse().unwrap_or(Decimal::ZERO)
    }
}

// Conversion implementations
impl From<AccountDB> for Account {
    fn from(db: AccountDB) -> Self {
        let initial_balance = db.initial_balance_decimal();
        let current_balance = db.current_balance_decimal();
        Self {
            id: db.id,
            name: db.name,
            account_type: db.account_type,
            initial_balance,
            current_balance,
            description: db.description,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewAccount> for AccountDB {
    fn from(domain: NewAccount) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            account_type: domain.account_type,
            // A fresh account starts with its initial balance
            initial_balance: domain.initial_balance.to_string(),
            current_balance: domain.initial_balance.to_string(),
            description: domain.description,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-type slice of the accounts summary
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccountTypeSummary {
    pub count: usize,
    pub total_balance: Decimal,
}

/// Summary of all active accounts grouped by account type
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccountsSummary {
    pub total_accounts: usize,
    pub total_balance: Decimal,
    pub by_type: HashMap<String, AccountTypeSummary>,
}
