mod common;

use chrono::{Duration, Local};
use rust_decimal_macros::dec;

use pocketbook_core::errors::Error;
use pocketbook_core::goals::{GoalService, GoalStatus, GoalType, NewGoal};

fn amount_goal(account_id: &str, target: rust_decimal::Decimal) -> NewGoal {
    NewGoal {
        id: None,
        name: "Emergency fund".to_string(),
        description: None,
        goal_type: GoalType::Amount,
        target_amount: target,
        target_date: None,
        account_id: account_id.to_string(),
    }
}

#[test]
fn contributions_accumulate_and_complete_the_goal() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Savings", dec!(0));

    let service = GoalService::new(db.pool.clone());
    let goal = service.create_goal(amount_goal(&account.id, dec!(100))).unwrap();
    assert_eq!(goal.status, GoalStatus::Active);

    let after_first = service.add_contribution(&goal.id, dec!(60)).unwrap();
    assert_eq!(after_first.current_amount, dec!(60));
    assert_eq!(after_first.status, GoalStatus::Active);
    assert!(after_first.completed_at.is_none());

    let after_second = service.add_contribution(&goal.id, dec!(40)).unwrap();
    assert_eq!(after_second.current_amount, dec!(100));
    assert_eq!(after_second.status, GoalStatus::Completed);
    assert!(after_second.completed_at.is_some());

    // completed goals take no further contributions
    let err = service.add_contribution(&goal.id, dec!(10)).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn withdrawals_never_push_the_saved_amount_below_zero() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Savings", dec!(0));

    let service = GoalService::new(db.pool.clone());
    let goal = service.create_goal(amount_goal(&account.id, dec!(100))).unwrap();

    service.add_contribution(&goal.id, dec!(30)).unwrap();
    let after = service.add_contribution(&goal.id, dec!(-50)).unwrap();
    assert_eq!(after.current_amount, dec!(0));
}

#[test]
fn overdue_and_near_completion_views() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Savings", dec!(0));
    let today = Local::now().date_naive();

    let service = GoalService::new(db.pool.clone());

    let mut dated = amount_goal(&account.id, dec!(1000));
    dated.name = "Vacation".to_string();
    dated.goal_type = GoalType::AmountDate;
    dated.target_date = Some(today - Duration::days(1));
    let overdue = service.create_goal(dated).unwrap();

    let almost = service.create_goal(amount_goal(&account.id, dec!(1000))).unwrap();
    service.update_progress(&almost.id, dec!(950)).unwrap();

    let overdue_goals = service.get_overdue_goals().unwrap();
    assert_eq!(overdue_goals.len(), 1);
    assert_eq!(overdue_goals[0].id, overdue.id);

    let near = service.get_near_completion_goals().unwrap();
    assert_eq!(near.len(), 1);
    assert_eq!(near[0].id, almost.id);
}

#[test]
fn statistics_aggregate_across_goals() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Savings", dec!(0));

    let service = GoalService::new(db.pool.clone());
    let first = service.create_goal(amount_goal(&account.id, dec!(200))).unwrap();
    let mut second_goal = amount_goal(&account.id, dec!(300));
    second_goal.name = "New laptop".to_string();
    let second = service.create_goal(second_goal).unwrap();

    service.update_progress(&first.id, dec!(200)).unwrap();
    service.update_progress(&second.id, dec!(50)).unwrap();

    let stats = service.get_statistics().unwrap();
    assert_eq!(stats.total_goals, 2);
    assert_eq!(stats.active_goals, 1);
    assert_eq!(stats.completed_goals, 1);
    assert_eq!(stats.total_target_amount, dec!(500));
    assert_eq!(stats.total_saved_amount, dec!(250));
    assert!((stats.overall_progress - 50.0).abs() < f64::EPSILON);
}

#[test]
fn pausing_blocks_contributions_until_resumed() {
    let db = common::setup_db();
    let account = common::seed_account(&db.pool, "Savings", dec!(0));

    let service = GoalService::new(db.pool.clone());
    let goal = service.create_goal(amount_goal(&account.id, dec!(100))).unwrap();

    service.set_goal_status(&goal.id, GoalStatus::Paused).unwrap();
    let err = service.add_contribution(&goal.id, dec!(10)).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    service.set_goal_status(&goal.id, GoalStatus::Active).unwrap();
    let after = service.add_contribution(&goal.id, dec!(10)).unwrap();
    assert_eq!(after.current_amount, dec!(10));
}

#[test]
fn goal_requires_an_active_account() {
    let db = common::setup_db();

    let err = GoalService::new(db.pool.clone())
        .create_goal(amount_goal("missing-account", dec!(100)))
        .unwrap_err();
    assert!(matches!(err, Error::Account(_)));
}
