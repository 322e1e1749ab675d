mod common;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use pocketbook_core::budgets::{BudgetService, NewBudget};
use pocketbook_core::errors::Error;
use pocketbook_core::transactions::{NewTransaction, TransactionService};

fn new_budget(category_id: &str, amount: rust_decimal::Decimal) -> NewBudget {
    NewBudget {
        id: None,
        name: "Groceries".to_string(),
        amount,
        period_year: 2024,
        period_month: 6,
        category_id: category_id.to_string(),
    }
}

fn record_expense(
    db: &common::TestDb,
    account_id: &str,
    category_id: &str,
    date: NaiveDate,
    amount: rust_decimal::Decimal,
) {
    TransactionService::new(db.pool.clone())
        .create_transaction(NewTransaction {
            id: None,
            amount: -amount.abs(),
            payee: "Store".to_string(),
            notes: None,
            transaction_date: date,
            is_income: false,
            account_id: account_id.to_string(),
            category_id: category_id.to_string(),
            recurring_transaction_id: None,
        })
        .unwrap();
}

/// Spent is recomputed from the category's expense transactions inside
/// the budget's month. Income and out-of-period spending do not count.
#[test]
fn spent_tracks_only_in_period_expenses() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(1000));
    let groceries = common::seed_category(&db.pool, "Groceries");
    let dining = common::seed_category(&db.pool, "Dining");

    let service = BudgetService::new(db.pool.clone());
    let budget = service.create_budget(new_budget(&groceries.id, dec!(400))).unwrap();
    assert_eq!(budget.spent_amount, dec!(0));

    let june = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
    record_expense(&db, &account.id, &groceries.id, june(5), dec!(120));
    record_expense(&db, &account.id, &groceries.id, june(20), dec!(80));
    // other category, other month, and income are all excluded
    record_expense(&db, &account.id, &dining.id, june(6), dec!(500));
    record_expense(
        &db,
        &account.id,
        &groceries.id,
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        dec!(999),
    );
    TransactionService::new(db.pool.clone())
        .create_transaction(NewTransaction {
            id: None,
            amount: dec!(50),
            payee: "Employer".to_string(),
            notes: None,
            transaction_date: june(10),
            is_income: true,
            account_id: account.id.clone(),
            category_id: groceries.id.clone(),
            recurring_transaction_id: None,
        })
        .unwrap();

    let analysis = service.get_budget(&budget.id).unwrap();
    assert_eq!(analysis.budget.spent_amount, dec!(200));
    assert_eq!(analysis.remaining, dec!(200));
    assert!(!analysis.is_over_budget);
    assert!((analysis.percentage_used - 50.0).abs() < f64::EPSILON);
}

#[test]
fn one_budget_per_category_and_month() {
    let db = common::setup_db();
    let groceries = common::seed_category(&db.pool, "Groceries");

    let service = BudgetService::new(db.pool.clone());
    service.create_budget(new_budget(&groceries.id, dec!(400))).unwrap();

    let err = service
        .create_budget(new_budget(&groceries.id, dec!(300)))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // a different month is fine
    let mut july = new_budget(&groceries.id, dec!(300));
    july.period_month = 7;
    assert!(service.create_budget(july).is_ok());
}

#[test]
fn period_summary_aggregates_all_budgets_of_the_month() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(1000));
    let groceries = common::seed_category(&db.pool, "Groceries");
    let dining = common::seed_category(&db.pool, "Dining");

    let service = BudgetService::new(db.pool.clone());
    service.create_budget(new_budget(&groceries.id, dec!(400))).unwrap();
    let mut dining_budget = new_budget(&dining.id, dec!(100));
    dining_budget.name = "Dining".to_string();
    service.create_budget(dining_budget).unwrap();

    let june = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();
    record_expense(&db, &account.id, &groceries.id, june(5), dec!(150));
    record_expense(&db, &account.id, &dining.id, june(6), dec!(150));

    let summary = service.get_period_summary(2024, 6).unwrap();
    assert_eq!(summary.total_budgeted, dec!(500));
    assert_eq!(summary.total_spent, dec!(300));
    assert_eq!(summary.total_remaining, dec!(200));
    assert_eq!(summary.over_budget_count, 1);
    assert_eq!(summary.budgets.len(), 2);
}

#[test]
fn budget_requires_an_existing_category() {
    let db = common::setup_db();

    let err = BudgetService::new(db.pool.clone())
        .create_budget(new_budget("missing-category", dec!(400)))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
