use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::Result;
use crate::schema::transfers;

use super::transfers_model::{Transfer, TransferDB};

/// Repository for transfer records
pub struct TransferRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl TransferRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Inserts a transfer record on the caller's connection so it commits
    /// together with its two transaction legs.
    pub fn insert_with_conn(conn: &mut SqliteConnection, transfer_db: &TransferDB) -> Result<()> {
        diesel::insert_into(transfers::table)
            .values(transfer_db)
            .execute(conn)?;
        Ok(())
    }

    /// Retrieves a transfer by its ID
    pub fn get_by_id(&self, transfer_id: &str) -> Result<Option<Transfer>> {
        let mut conn = get_connection(&self.pool)?;

        let transfer = transfers::table
            .find(transfer_id)
            .first::<TransferDB>(&mut conn)
            .optional()?;

        Ok(transfer.map(Transfer::from))
    }

    /// Lists transfers, newest first, optionally narrowed to those
    /// touching one account on either side
    pub fn list(&self, account_id: Option<&str>) -> Result<Vec<Transfer>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = transfers::table.into_boxed();

        if let Some(account) = account_id {
            query = query.filter(
                transfers::from_account_id
                    .eq(account.to_string())
                    .or(transfers::to_account_id.eq(account.to_string())),
            );
        }

        let rows = query
            .order(transfers::transfer_date.desc())
            .load::<TransferDB>(&mut conn)?;

        Ok(rows.into_iter().map(Transfer::from).collect())
    }
}
