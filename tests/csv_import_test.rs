mod common;

use std::collections::HashMap;

use rust_decimal_macros::dec;

use pocketbook_core::errors::Error;
use pocketbook_core::imports::{CsvUploadRequest, ImportError, ImportService};
use pocketbook_core::transactions::{TransactionFilter, TransactionService};

fn upload_request(account_id: &str, category_id: &str) -> CsvUploadRequest {
    CsvUploadRequest {
        account_id: account_id.to_string(),
        default_category_id: category_id.to_string(),
        skip_header: false,
        date_format: None,
        category_overrides: HashMap::new(),
    }
}

/// Ten data rows where row 5 carries an unparseable date: nine rows land,
/// one failure references line 5, and the good rows are not rolled back.
#[test]
fn one_bad_row_does_not_sink_the_batch() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(1000));
    let category = common::seed_category(&db.pool, "Misc");

    let mut lines = Vec::new();
    for i in 1..=8 {
        let date = if i == 5 {
            "not-a-date".to_string()
        } else {
            format!("2024-03-{:02}", i)
        };
        lines.push(format!("{},Store {},{}.50,,x", date, i, 10 + i));
    }
    lines.push("2024-03-09,Employer,,2000.00,x".to_string());
    lines.push("2024-03-10,Refund,, -25.00 ,x".to_string());
    let content = lines.join("\n");

    let service = ImportService::new(db.pool.clone());
    let response = service
        .import_csv(&content, upload_request(&account.id, &category.id))
        .unwrap();

    assert!(!response.success);
    assert_eq!(response.total_rows, 10);
    assert_eq!(response.successful_imports, 9);
    assert_eq!(response.failed_imports, 1);
    assert_eq!(response.imported_transaction_ids.len(), 9);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].row_number, 5);
    assert!(response.errors[0].message.contains("date"));

    let filter = TransactionFilter {
        account_id: Some(account.id.clone()),
        ..Default::default()
    };
    let persisted = TransactionService::new(db.pool.clone())
        .search_transactions(&filter, 100, 0)
        .unwrap();
    assert_eq!(persisted.len(), 9);
}

/// Expense rows persist strictly negative and income rows strictly
/// positive, whatever sign the source text carried.
#[test]
fn sign_follows_the_populated_column() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(0));
    let category = common::seed_category(&db.pool, "Misc");

    // the expense is written positive, the income negative
    let content = "2024-03-01,Grocery,45.50,,x\n2024-03-02,Rebate,,-25.00,x";

    ImportService::new(db.pool.clone())
        .import_csv(content, upload_request(&account.id, &category.id))
        .unwrap();

    let filter = TransactionFilter {
        account_id: Some(account.id.clone()),
        ..Default::default()
    };
    let persisted = TransactionService::new(db.pool.clone())
        .search_transactions(&filter, 100, 0)
        .unwrap();

    let grocery = persisted.iter().find(|t| t.payee == "Grocery").unwrap();
    assert_eq!(grocery.amount, dec!(-45.50));
    assert!(!grocery.is_income);

    let rebate = persisted.iter().find(|t| t.payee == "Rebate").unwrap();
    assert_eq!(rebate.amount, dec!(25.00));
    assert!(rebate.is_income);
}

#[test]
fn import_refreshes_the_account_balance() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(100));
    let category = common::seed_category(&db.pool, "Misc");

    let content = "2024-03-01,Store,40.00,,x\n2024-03-02,Employer,,500.00,x";

    ImportService::new(db.pool.clone())
        .import_csv(content, upload_request(&account.id, &category.id))
        .unwrap();

    let balance = pocketbook_core::accounts::AccountService::new(db.pool.clone())
        .get_account_balance(&account.id)
        .unwrap();
    assert_eq!(balance, dec!(560));
}

#[test]
fn per_row_category_overrides_win_over_the_default() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(0));
    let default_category = common::seed_category(&db.pool, "Misc");
    let dining = common::seed_category(&db.pool, "Dining");

    let content = "2024-03-01,Store,10.00,,x\n2024-03-02,Cafe,12.00,,x";

    let mut request = upload_request(&account.id, &default_category.id);
    request.category_overrides.insert(2, dining.id.clone());

    ImportService::new(db.pool.clone())
        .import_csv(content, request)
        .unwrap();

    let filter = TransactionFilter {
        account_id: Some(account.id.clone()),
        ..Default::default()
    };
    let persisted = TransactionService::new(db.pool.clone())
        .search_transactions(&filter, 100, 0)
        .unwrap();

    let cafe = persisted.iter().find(|t| t.payee == "Cafe").unwrap();
    assert_eq!(cafe.category_id, dining.id);
    let store = persisted.iter().find(|t| t.payee == "Store").unwrap();
    assert_eq!(store.category_id, default_category.id);
}

#[test]
fn missing_references_abort_the_whole_batch() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(0));
    let category = common::seed_category(&db.pool, "Misc");

    let content = "2024-03-01,Store,10.00,,x";
    let service = ImportService::new(db.pool.clone());

    let err = service
        .import_csv(content, upload_request("missing-account", &category.id))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Import(ImportError::AccountNotFound(_))
    ));

    let err = service
        .import_csv(content, upload_request(&account.id, "missing-category"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Import(ImportError::CategoryNotFound(_))
    ));

    // nothing was written
    let filter = TransactionFilter {
        account_id: Some(account.id.clone()),
        ..Default::default()
    };
    let persisted = TransactionService::new(db.pool.clone())
        .search_transactions(&filter, 100, 0)
        .unwrap();
    assert!(persisted.is_empty());
}

#[test]
fn row_numbers_count_the_skipped_header() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(0));
    let category = common::seed_category(&db.pool, "Misc");

    let content = "date,payee,expense,income,card\n2024-03-01,Store,10.00,,x\nbad line";

    let mut request = upload_request(&account.id, &category.id);
    request.skip_header = true;

    let response = ImportService::new(db.pool.clone())
        .import_csv(content, request)
        .unwrap();

    assert_eq!(response.successful_imports, 1);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].row_number, 3);
}

#[test]
fn preview_detects_the_delimiter_and_caps_the_sample() {
    let db = common::setup_db();

    let mut lines = Vec::new();
    for i in 1..=12 {
        lines.push(format!("2024-03-{:02}\tStore {}\t10.00\t\tx", i, i));
    }
    let content = lines.join("\n");

    let preview = ImportService::new(db.pool.clone())
        .preview_csv(&content, false, None)
        .unwrap();

    assert_eq!(preview.delimiter, '\t');
    assert_eq!(preview.total_rows, 12);
    assert_eq!(preview.rows.len(), 10);
    assert!(preview.rows.iter().all(|r| r.is_valid));
    assert_eq!(preview.rows[0].amount, Some(dec!(-10.00)));
}

#[test]
fn preview_flags_unparseable_rows_without_failing() {
    let db = common::setup_db();

    let content = "2024-03-01,Store,10.00,,x\nnot-a-date,Cafe,12.00,,x\nshort,row";

    let preview = ImportService::new(db.pool.clone())
        .preview_csv(content, false, None)
        .unwrap();

    assert_eq!(preview.total_rows, 3);
    assert!(preview.rows[0].is_valid);
    assert!(!preview.rows[1].is_valid);
    assert!(preview.rows[1].errors[0].contains("date"));
    assert!(!preview.rows[2].is_valid);
}
