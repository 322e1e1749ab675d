use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};

/// What a savings goal is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    /// Reach a target amount, no deadline
    Amount,
    /// Reach a target amount by a target date
    AmountDate,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Amount => "amount",
            GoalType::AmountDate => "amount_date",
        }
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "amount" => Ok(GoalType::Amount),
            "amount_date" => Ok(GoalType::AmountDate),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown goal type '{}'",
                other
            )))),
        }
    }
}

/// Lifecycle state of a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
    Cancelled,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "active",
            GoalStatus::Completed => "completed",
            GoalStatus::Paused => "paused",
            GoalStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(GoalStatus::Active),
            "completed" => Ok(GoalStatus::Completed),
            "paused" => Ok(GoalStatus::Paused),
            "cancelled" => Ok(GoalStatus::Cancelled),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown goal status '{}'",
                other
            )))),
        }
    }
}

/// Domain model for a savings goal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub status: GoalStatus,
    pub target_amount: Decimal,
    pub target_date: Option<NaiveDate>,
    pub current_amount: Decimal,
    pub account_id: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

impl Goal {
    pub fn remaining_amount(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    pub fn is_reached(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Saved as a percentage of the target, capped at 100
    pub fn progress_percentage(&self) -> f64 {
        if self.target_amount <= Decimal::ZERO {
            return 0.0;
        }
        let pct = (self.current_amount / self.target_amount * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0);
        pct.min(100.0)
    }

    /// A dated goal is overdue once its target date has passed without
    /// the target being reached
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.target_date {
            Some(deadline) => !self.is_reached() && deadline < today,
            None => false,
        }
    }

    pub fn days_remaining(&self, today: NaiveDate) -> Option<i64> {
        self.target_date
            .map(|deadline| (deadline - today).num_days())
    }
}

/// Database model for goals
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
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalDB {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub goal_type: String,
    pub status: String,
    pub target_amount: String,
    pub target_date: Option<NaiveDate>,
    pub current_amount: String,
    pub account_id: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

impl GoalDB {
    pub fn target_amount_decimal(&self) -> Decimal {
        self.target_amount.parse().unwrap_or(Decimal::ZERO)
    }

    pub fn current_amount_decimal(&self) -> Decimal {
        self.current_amount.parse().unwrap_or(Decimal::ZERO)
    }
}

/// Input model for creating a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_amount: Decimal,
    pub target_date: Option<NaiveDate>,
    pub account_id: String,
}

impl NewGoal {
    /// Validates the new goal data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Target amount must be positive".to_string(),
            )));
        }
        if self.goal_type == GoalType::AmountDate && self.target_date.is_none() {
            return Err(Error::Validation(ValidationError::MissingField(
                "targetDate".to_string(),
            )));
        }
        if self.account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "accountId".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for updating a goal's descriptive fields and target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub target_amount: Decimal,
    pub target_date: Option<NaiveDate>,
}

impl GoalUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Target amount must be positive".to_string(),
            )));
        }
        Ok(())
    }
}

/// Aggregate figures over all active goals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalStats {
    pub total_goals: usize,
    pub active_goals: usize,
    pub completed_goals: usize,
    pub total_target_amount: Decimal,
    pub total_saved_amount: Decimal,
    pub overall_progress: f64,
}

// Conversion implementations
impl TryFrom<GoalDB> for Goal {
    type Error = Error;

    fn try_from(db: GoalDB) -> Result<Self> {
        let goal_type = GoalType::from_str(&db.goal_type)?;
        let status = GoalStatus::from_str(&db.status)?;
        let target_amount = db.target_amount_decimal();
        let current_amount = db.current_amount_decimal();
        Ok(Self {
            id: db.id,
            name: db.name,
            description: db.description,
            goal_type,
            status,
            target_amount,
            target_date: db.target_date,
            current_amount,
            account_id: db.account_id,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
            completed_at: db.completed_at,
        })
    }
}

impl From<NewGoal> for GoalDB {
    fn from(domain: NewGoal) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            description: domain.description,
            goal_type: domain.goal_type.as_str().to_string(),
            status: GoalStatus::Active.as_str().to_string(),
            target_amount: domain.target_amount.to_string(),
            target_date: domain.target_date,
            current_amount: Decimal::ZERO.to_string(),
            account_id: domain.account_id,
            is_active: true,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn goal(target: Decimal, current: Decimal, deadline: Option<NaiveDate>) -> Goal {
        let now = chrono::Utc::now().naive_utc();
        Goal {
            id: "g1".to_string(),
            name: "Emergency fund".to_string(),
            description: None,
            goal_type: if deadline.is_some() {
                GoalType::AmountDate
            } else {
                GoalType::Amount
            },
            status: GoalStatus::Active,
            target_amount: target,
            target_date: deadline,
            current_amount: current,
            account_id: "acc".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    #[test]
    fn progress_is_capped_at_one_hundred_percent() {
        let g = goal(dec!(1000), dec!(250), None);
        assert!((g.progress_percentage() - 25.0).abs() < f64::EPSILON);
        assert_eq!(g.remaining_amount(), dec!(750));

        let overfunded = goal(dec!(1000), dec!(1200), None);
        assert!((overfunded.progress_percentage() - 100.0).abs() < f64::EPSILON);
        assert_eq!(overfunded.remaining_amount(), dec!(0));
        assert!(overfunded.is_reached());
    }

    #[test]
    fn overdue_requires_a_passed_deadline_and_unmet_target() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let deadline = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        assert!(goal(dec!(1000), dec!(500), Some(deadline)).is_overdue(today));
        assert!(!goal(dec!(1000), dec!(1000), Some(deadline)).is_overdue(today));
        assert!(!goal(dec!(1000), dec!(500), None).is_overdue(today));
    }

    #[test]
    fn dated_goal_requires_a_target_date() {
        let new_goal = NewGoal {
            id: None,
            name: "Vacation".to_string(),
            description: None,
            goal_type: GoalType::AmountDate,
            target_amount: dec!(2000),
            target_date: None,
            account_id: "acc".to_string(),
        };
        assert!(new_goal.validate().is_err());
    }
}
