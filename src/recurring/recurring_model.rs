use chrono::{Duration, Months, NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::recurring_errors::RecurringError;
use super::Result;

/// How often a recurring transaction fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Advances a date by one frequency step.
    ///
    /// Month-based steps clamp the day-of-month to the last valid day of
    /// the target month, so Jan 31 + 1 month lands on Feb 28 (or Feb 29
    /// in a leap year) rather than failing.
    pub fn advance(&self, from: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => from + Duration::days(1),
            Frequency::Weekly => from + Duration::days(7),
            Frequency::Biweekly => from + Duration::days(14),
            Frequency::Monthly => from + Months::new(1),
            Frequency::Quarterly => from + Months::new(3),
            Frequency::Yearly => from + Months::new(12),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = RecurringError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(RecurringError::InvalidData(format!(
                "Unknown frequency '{}'",
                other
            ))),
        }
    }
}

/// Domain model for a recurring transaction definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTransaction {
    pub id: String,
    pub amount: Decimal,
    pub description: String,
    pub notes: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub next_occurrence_date: NaiveDate,
    pub is_income: bool,
    pub is_active: bool,
    pub account_id: String,
    pub category_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for recurring transactions
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
#[diesel(table_name = crate::schema::recurring_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct RecurringTransactionDB {
    pub id: String,
    pub amount: String,
    pub description: String,
    pub notes: Option<String>,
    pub frequency: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub next_occurrence_date: NaiveDate,
    pub is_income: bool,
    pub is_active: bool,
    pub account_id: String,
    pub category_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl RecurringTransactionDB {
    pub fn amount_decimal(&self) -> Decimal {
        self.amount.parse().unwrap_or(Decimal::ZERO)
    }
}

/// Input model for creating a recurring transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecurringTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub amount: Decimal,
    pub description: String,
    pub notes: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_income: bool,
    pub account_id: String,
    pub category_id: String,
}

impl NewRecurringTransaction {
    /// Validates the new recurring transaction data
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(RecurringError::InvalidData(
                "Description cannot be empty".to_string(),
            ));
        }
        if self.amount == Decimal::ZERO {
            return Err(RecurringError::InvalidData(
                "Amount cannot be zero".to_string(),
            ));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(RecurringError::InvalidData(
                    "End date cannot precede start date".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Input model for updating a recurring transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTransactionUpdate {
    pub id: String,
    pub amount: Decimal,
    pub description: String,
    pub notes: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_income: bool,
    pub account_id: String,
    pub category_id: String,
}

impl RecurringTransactionUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(RecurringError::InvalidData(
                "Recurring transaction ID is required for updates".to_string(),
            ));
        }
        if self.description.trim().is_empty() {
            return Err(RecurringError::InvalidData(
                "Description cannot be empty".to_string(),
            ));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(RecurringError::InvalidData(
                    "End date cannot precede start date".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// Conversion implementations
impl TryFrom<RecurringTransactionDB> for RecurringTransaction {
    type Error = RecurringError;

    fn try_from(db: RecurringTransactionDB) -> Result<Self> {
        let frequency = Frequency::from_str(&db.frequency)?;
        let amount = db.amount_decimal();
        Ok(Self {
            id: db.id,
            amount,
            description: db.description,
            notes: db.notes,
            frequency,
            start_date: db.start_date,
            end_date: db.end_date,
            next_occurrence_date: db.next_occurrence_date,
            is_income: db.is_income,
            is_active: db.is_active,
            account_id: db.account_id,
            category_id: db.category_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<NewRecurringTransaction> for RecurringTransactionDB {
    fn from(domain: NewRecurringTransaction) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            amount: domain.amount.to_string(),
            description: domain.description,
            notes: domain.notes,
            frequency: domain.frequency.as_str().to_string(),
            // Generation begins at the start date itself
            next_occurrence_date: domain.start_date,
            start_date: domain.start_date,
            end_date: domain.end_date,
            is_income: domain.is_income,
            is_active: true,
            account_id: domain.account_id,
            category_id: domain.category_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_based_frequencies_advance_by_fixed_spans() {
        let anchor = date(2024, 3, 15);
        assert_eq!(Frequency::Daily.advance(anchor), date(2024, 3, 16));
        assert_eq!(Frequency::Weekly.advance(anchor), date(2024, 3, 22));
        assert_eq!(Frequency::Biweekly.advance(anchor), date(2024, 3, 29));
    }

    #[test]
    fn monthly_advance_clamps_to_last_day_of_short_month() {
        // 2024 is a leap year
        assert_eq!(
            Frequency::Monthly.advance(date(2024, 1, 31)),
            date(2024, 2, 29)
        );
        assert_eq!(
            Frequency::Monthly.advance(date(2023, 1, 31)),
            date(2023, 2, 28)
        );
        assert_eq!(
            Frequency::Monthly.advance(date(2024, 3, 31)),
            date(2024, 4, 30)
        );
    }

    #[test]
    fn quarterly_and_yearly_advance_by_calendar_months() {
        assert_eq!(
            Frequency::Quarterly.advance(date(2024, 1, 31)),
            date(2024, 4, 30)
        );
        assert_eq!(
            Frequency::Yearly.advance(date(2024, 2, 29)),
            date(2025, 2, 28)
        );
        assert_eq!(
            Frequency::Yearly.advance(date(2024, 6, 15)),
            date(2025, 6, 15)
        );
    }

    #[test]
    fn frequency_round_trips_through_strings() {
        for frequency in [
            Frequency::Daily,
            Frequency::Weekly,
            Frequency::Biweekly,
            Frequency::Monthly,
            Frequency::Quarterly,
            Frequency::Yearly,
        ] {
            assert_eq!(Frequency::from_str(frequency.as_str()).unwrap(), frequency);
        }
        assert!(Frequency::from_str("fortnightly").is_err());
    }

    #[test]
    fn new_recurring_rejects_end_before_start() {
        let definition = NewRecurringTransaction {
            id: None,
            amount: Decimal::new(5000, 2),
            description: "Rent".to_string(),
            notes: None,
            frequency: Frequency::Monthly,
            start_date: date(2024, 5, 1),
            end_date: Some(date(2024, 4, 1)),
            is_income: false,
            account_id: "acc".to_string(),
            category_id: "cat".to_string(),
        };
        assert!(definition.validate().is_err());
    }
}
