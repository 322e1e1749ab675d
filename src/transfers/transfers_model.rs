use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Domain model for a completed transfer between two accounts. A transfer
/// is a record linking the pair of transactions that moved the money.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: String,
    pub from_account_id: String,
    pub to_account_id: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub transfer_date: NaiveDate,
    pub from_transaction_id: String,
    pub to_transaction_id: String,
    pub created_at: NaiveDateTime,
}

/// Database model for transfers
#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::transfers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransferDB {
    pub id: String,
    pub from_account_id: String,
    pub to_account_id: String,
    pub amount: String,
    pub description: Option<String>,
    pub transfer_date: NaiveDate,
    pub from_transaction_id: String,
    pub to_transaction_id: String,
    pub created_at: NaiveDateTime,
}

impl TransferDB {
    pub fn amount_decimal(&self) -> Decimal {
        self.amount.parse().unwrap_or(Decimal::ZERO)
    }
}

/// Input model for requesting a transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransfer {
    pub from_account_id: String,
    pub to_account_id: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub transfer_date: NaiveDate,
}

impl NewTransfer {
    /// Validates the transfer request
    pub fn validate(&self) -> Result<()> {
        if self.from_account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "fromAccountId".to_string(),
            )));
        }
        if self.to_account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "toAccountId".to_string(),
            )));
        }
        if self.from_account_id == self.to_account_id {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Cannot transfer between an account and itself".to_string(),
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Transfer amount must be positive".to_string(),
            )));
        }
        Ok(())
    }
}

// Conversion implementations
impl From<TransferDB> for Transfer {
    fn from(db: TransferDB) -> Self {
        let amount = db.amount_decimal();
        Self {
            id: db.id,
            from_account_id: db.from_account_id,
            to_account_id: db.to_account_id,
            amount,
            description: db.description,
            transfer_date: db.transfer_date,
            from_transaction_id: db.from_transaction_id,
            to_transaction_id: db.to_transaction_id,
            created_at: db.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn transfer_request_validation() {
        let mut request = NewTransfer {
            from_account_id: "a1".to_string(),
            to_account_id: "a2".to_string(),
            amount: dec!(50),
            description: None,
            transfer_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        assert!(request.validate().is_ok());

        request.to_account_id = "a1".to_string();
        assert!(request.validate().is_err());

        request.to_account_id = "a2".to_string();
        request.amount = dec!(-50);
        assert!(request.validate().is_err());
    }
}
