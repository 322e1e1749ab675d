#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use tempfile::TempDir;

use pocketbook_core::accounts::{Account, AccountService, NewAccount};
use pocketbook_core::categories::{Category, CategoryService, NewCategory};
use pocketbook_core::db::{self, DbPool};

/// A pooled connection to a migrated database living in a temporary
/// directory. Dropping it removes the database file.
pub struct TestDb {
    pub pool: Arc<DbPool>,
    _dir: TempDir,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pocketbook.db");
    let pool = db::create_pool(db_path.to_str().unwrap()).unwrap();
    db::run_migrations(&pool).unwrap();
    TestDb { pool, _dir: dir }
}

pub fn seed_account(pool: &Arc<DbPool>, name: &str, initial_balance: Decimal) -> Account {
    AccountService::new(pool.clone())
        .create_account(NewAccount {
            id: None,
            name: name.to_string(),
            account_type: "checking".to_string(),
            initial_balance,
            description: None,
        })
        .unwrap()
}

pub fn seed_category(pool: &Arc<DbPool>, name: &str) -> Category {
    CategoryService::new(pool.clone())
        .create_category(NewCategory {
            id: None,
            name: name.to_string(),
            description: None,
            is_predefined: false,
        })
        .unwrap()
}
