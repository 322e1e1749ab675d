use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Domain model for a monthly budget on a category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub spent_amount: Decimal,
    pub period_year: i32,
    pub period_month: i32,
    pub category_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Budget {
    pub fn remaining(&self) -> Decimal {
        self.amount - self.spent_amount
    }

    pub fn is_over_budget(&self) -> bool {
        self.spent_amount > self.amount
    }

    /// Spent as a percentage of the budgeted amount. A zero budget reads
    /// as fully consumed once anything is spent.
    pub fn percentage_used(&self) -> f64 {
        if self.amount == Decimal::ZERO {
            if self.spent_amount > Decimal::ZERO {
                return 100.0;
            }
            return 0.0;
        }
        (self.spent_amount / self.amount * Decimal::ONE_HUNDRED)
            .to_f64()
            .unwrap_or(0.0)
    }

    /// First day of the budget's period
    pub fn period_start(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.period_year, self.period_month as u32, 1)
    }
}

/// Database model for budgets
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
#[diesel(table_name = crate::schema::budgets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BudgetDB {
    pub id: String,
    pub name: String,
    pub amount: String,
    pub spent_amount: String,
    pub period_year: i32,
    pub period_month: i32,
    pub category_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl BudgetDB {
    pub fn amount_decimal(&self) -> Decimal {
        self.amount.parse().unwrap_or(Decimal::ZERO)
    }

    pub fn spent_amount_decimal(&self) -> Decimal {
        self.spent_amount.parse().unwrap_or(Decimal::ZERO)
    }
}

/// Input model for creating a budget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub amount: Decimal,
    pub period_year: i32,
    pub period_month: i32,
    pub category_id: String,
}

impl NewBudget {
    /// Validates the new budget data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Budget amount must be positive".to_string(),
            )));
        }
        if !(1..=12).contains(&self.period_month) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Invalid period month: {}",
                self.period_month
            ))));
        }
        if self.category_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "categoryId".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for updating a budget's name or amount. The period and
/// category are fixed once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
}

impl BudgetUpdate {
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
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Budget amount must be positive".to_string(),
            )));
        }
        Ok(())
    }
}

/// A budget together with its derived consumption figures
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAnalysis {
    pub budget: Budget,
    pub remaining: Decimal,
    pub percentage_used: f64,
    pub is_over_budget: bool,
}

impl From<Budget> for BudgetAnalysis {
    fn from(budget: Budget) -> Self {
        let remaining = budget.remaining();
        let percentage_used = budget.percentage_used();
        let is_over_budget = budget.is_over_budget();
        Self {
            budget,
            remaining,
            percentage_used,
            is_over_budget,
        }
    }
}

/// Aggregate view over all budgets in one month
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPeriodSummary {
    pub period_year: i32,
    pub period_month: i32,
    pub total_budgeted: Decimal,
    pub total_spent: Decimal,
    pub total_remaining: Decimal,
    pub over_budget_count: usize,
    pub budgets: Vec<BudgetAnalysis>,
}

// Conversion implementations
impl From<BudgetDB> for Budget {
    fn from(db: BudgetDB) -> Self {
        let amount = db.amount_decimal();
        let spent_amount = db.spent_amount_decimal();
        Self {
            id: db.id,
            name: db.name,
            amount,
            spent_amount,
            period_year: db.period_year,
            period_month: db.period_month,
            category_id: db.category_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewBudget> for BudgetDB {
    fn from(domain: NewBudget) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            amount: domain.amount.to_string(),
            spent_amount: Decimal::ZERO.to_string(),
            period_year: domain.period_year,
            period_month: domain.period_month,
            category_id: domain.category_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn budget(amount: Decimal, spent: Decimal) -> Budget {
        let now = chrono::Utc::now().naive_utc();
        Budget {
            id: "b1".to_string(),
            name: "Groceries".to_string(),
            amount,
            spent_amount: spent,
            period_year: 2024,
            period_month: 6,
            category_id: "cat".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn consumption_figures_follow_spent_amount() {
        let b = budget(dec!(400), dec!(100));
        assert_eq!(b.remaining(), dec!(300));
        assert!((b.percentage_used() - 25.0).abs() < f64::EPSILON);
        assert!(!b.is_over_budget());

        let over = budget(dec!(400), dec!(450));
        assert_eq!(over.remaining(), dec!(-50));
        assert!(over.is_over_budget());
    }

    #[test]
    fn new_budget_rejects_bad_month_and_amount() {
        let mut new_budget = NewBudget {
            id: None,
            name: "Dining".to_string(),
            amount: dec!(200),
            period_year: 2024,
            period_month: 13,
            category_id: "cat".to_string(),
        };
        assert!(new_budget.validate().is_err());

        new_budget.period_month = 6;
        new_budget.amount = dec!(0);
        assert!(new_budget.validate().is_err());

        new_budget.amount = dec!(200);
        assert!(new_budget.validate().is_ok());
    }
}
