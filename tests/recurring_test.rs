mod common;

use chrono::{Duration, Local, NaiveDate};
use rust_decimal_macros::dec;

use pocketbook_core::recurring::{
    Frequency, NewRecurringTransaction, RecurringError, RecurringService,
};
use pocketbook_core::transactions::{TransactionFilter, TransactionService};

fn definition(
    account_id: &str,
    category_id: &str,
    frequency: Frequency,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> NewRecurringTransaction {
    NewRecurringTransaction {
        id: None,
        amount: dec!(50),
        description: "Gym membership".to_string(),
        notes: None,
        frequency,
        start_date,
        end_date,
        is_income: false,
        account_id: account_id.to_string(),
        category_id: category_id.to_string(),
    }
}

#[test]
fn creation_schedules_the_first_occurrence_at_the_start_date() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(1000));
    let category = common::seed_category(&db.pool, "Health");

    let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let service = RecurringService::new(db.pool.clone());
    let created = service
        .create_recurring(definition(
            &account.id,
            &category.id,
            Frequency::Monthly,
            start,
            None,
        ))
        .unwrap();

    assert_eq!(created.next_occurrence_date, start);
    assert!(created.is_active);
}

/// Generating from a Jan 31 monthly anchor lands on the clamped last day
/// of February, not an error.
#[test]
fn monthly_generation_clamps_month_end_anchors() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(1000));
    let category = common::seed_category(&db.pool, "Health");

    let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let service = RecurringService::new(db.pool.clone());
    let created = service
        .create_recurring(definition(
            &account.id,
            &category.id,
            Frequency::Monthly,
            start,
            None,
        ))
        .unwrap();

    let transaction = service.generate_occurrence(&created.id).unwrap();
    assert_eq!(transaction.transaction_date, start);
    assert_eq!(transaction.amount, dec!(-50));
    assert_eq!(transaction.recurring_transaction_id, Some(created.id.clone()));

    let after = service.get_recurring(&created.id).unwrap();
    assert_eq!(
        after.next_occurrence_date,
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );
}

/// Running the sweep twice back to back generates each due definition
/// exactly once: the first run pushes next_occurrence_date into the
/// future, so the second run finds nothing due.
#[test]
fn back_to_back_sweeps_do_not_double_generate() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(1000));
    let category = common::seed_category(&db.pool, "Health");

    let today = Local::now().date_naive();
    let service = RecurringService::new(db.pool.clone());
    let created = service
        .create_recurring(definition(
            &account.id,
            &category.id,
            Frequency::Yearly,
            today,
            None,
        ))
        .unwrap();

    assert_eq!(service.process_due().unwrap(), 1);
    assert_eq!(service.process_due().unwrap(), 0);

    let filter = TransactionFilter {
        account_id: Some(account.id.clone()),
        ..Default::default()
    };
    let generated = TransactionService::new(db.pool.clone())
        .search_transactions(&filter, 100, 0)
        .unwrap();
    assert_eq!(generated.len(), 1);

    let after = service.get_recurring(&created.id).unwrap();
    assert!(after.next_occurrence_date > today);
}

#[test]
fn a_lapsed_definition_refuses_generation_and_is_skipped_by_the_sweep() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(1000));
    let category = common::seed_category(&db.pool, "Health");

    let today = Local::now().date_naive();
    let service = RecurringService::new(db.pool.clone());
    let created = service
        .create_recurring(definition(
            &account.id,
            &category.id,
            Frequency::Daily,
            today - Duration::days(10),
            Some(today - Duration::days(1)),
        ))
        .unwrap();

    let err = service.generate_occurrence(&created.id).unwrap_err();
    assert!(matches!(err, RecurringError::Ended(_)));

    assert_eq!(service.process_due().unwrap(), 0);
}

#[test]
fn a_soft_deleted_definition_refuses_generation() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(1000));
    let category = common::seed_category(&db.pool, "Health");

    let today = Local::now().date_naive();
    let service = RecurringService::new(db.pool.clone());
    let created = service
        .create_recurring(definition(
            &account.id,
            &category.id,
            Frequency::Weekly,
            today,
            None,
        ))
        .unwrap();

    service.delete_recurring(&created.id).unwrap();

    let err = service.generate_occurrence(&created.id).unwrap_err();
    assert!(matches!(err, RecurringError::Inactive(_)));
}

#[test]
fn generation_updates_the_account_balance() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Checking", dec!(1000));
    let category = common::seed_category(&db.pool, "Health");

    let today = Local::now().date_naive();
    let service = RecurringService::new(db.pool.clone());
    let created = service
        .create_recurring(definition(
            &account.id,
            &category.id,
            Frequency::Monthly,
            today,
            None,
        ))
        .unwrap();

    service.generate_occurrence(&created.id).unwrap();

    let balance = pocketbook_core::accounts::AccountService::new(db.pool.clone())
        .get_account_balance(&account.id)
        .unwrap();
    assert_eq!(balance, dec!(950));
}
