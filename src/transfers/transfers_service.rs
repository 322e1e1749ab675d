use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use crate::accounts::AccountRepository;
use crate::categories::CategoryRepository;
use crate::constants::TRANSFER_CATEGORY_NAME;
use crate::db::DbTransactionExecutor;
use crate::errors::{Error, Result, ValidationError};
use crate::transactions::{NewTransaction, TransactionRepository};

use super::transfers_model::{NewTransfer, Transfer, TransferDB};
use super::transfers_repository::TransferRepository;

/// Service for moving money between accounts. A transfer writes two
/// transactions, one per account, plus a transfer record linking them,
/// all in one database transaction.
pub struct TransferService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl TransferService {
    /// Creates a new TransferService instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Executes a transfer between two active accounts
    pub fn create_transfer(&self, new_transfer: NewTransfer) -> Result<Transfer> {
        new_transfer.validate()?;

        let account_repo = AccountRepository::new(self.pool.clone());
        let from_account = account_repo.get_active(&new_transfer.from_account_id)?;
        let to_account = account_repo.get_active(&new_transfer.to_account_id)?;

        if from_account.current_balance < new_transfer.amount {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Insufficient funds in account '{}': balance {} is less than transfer amount {}",
                from_account.name, from_account.current_balance, new_transfer.amount
            ))));
        }

        let transfer_db = self.pool.execute(|conn| -> Result<TransferDB> {
            let category = CategoryRepository::get_or_create_with_conn(
                conn,
                TRANSFER_CATEGORY_NAME,
                Some("Transfers between accounts"),
                true,
            )?;

            let outgoing = TransactionRepository::insert_with_conn(
                conn,
                NewTransaction {
                    id: None,
                    amount: -new_transfer.amount,
                    payee: format!("Transfer to {}", to_account.name),
                    notes: new_transfer.description.clone(),
                    transaction_date: new_transfer.transfer_date,
                    is_income: false,
                    account_id: from_account.id.clone(),
                    category_id: category.id.clone(),
                    recurring_transaction_id: None,
                },
            )?;

            let incoming = TransactionRepository::insert_with_conn(
                conn,
                NewTransaction {
                    id: None,
                    amount: new_transfer.amount,
                    payee: format!("Transfer from {}", from_account.name),
                    notes: new_transfer.description.clone(),
                    transaction_date: new_transfer.transfer_date,
                    is_income: true,
                    account_id: to_account.id.clone(),
                    category_id: category.id,
                    recurring_transaction_id: None,
                },
            )?;

            let transfer_db = TransferDB {
                id: uuid::Uuid::new_v4().to_string(),
                from_account_id: from_account.id.clone(),
                to_account_id: to_account.id.clone(),
                amount: new_transfer.amount.to_string(),
                description: new_transfer.description.clone(),
                transfer_date: new_transfer.transfer_date,
                from_transaction_id: outgoing.id,
                to_transaction_id: incoming.id,
                created_at: chrono::Utc::now().naive_utc(),
            };

            TransferRepository::insert_with_conn(conn, &transfer_db)?;

            Ok(transfer_db)
        })?;

        account_repo.recalculate_balance(&from_account.id)?;
        account_repo.recalculate_balance(&to_account.id)?;

        debug!(
            "Transferred {} from account {} to account {}",
            new_transfer.amount, from_account.id, to_account.id
        );

        Ok(transfer_db.into())
    }

    /// Retrieves a transfer by its ID
    pub fn get_transfer(&self, transfer_id: &str) -> Result<Transfer> {
        TransferRepository::new(self.pool.clone())
            .get_by_id(transfer_id)?
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Transfer with id {} not found",
                    transfer_id
                )))
            })
    }

    /// Lists transfers, optionally narrowed to one account
    pub fn list_transfers(&self, account_id: Option<&str>) -> Result<Vec<Transfer>> {
        TransferRepository::new(self.pool.clone()).list(account_id)
    }
}
