use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::{Error, Result, ValidationError};
use crate::schema::goals;

use super::goals_model::{Goal, GoalDB, GoalStatus, GoalUpdate, NewGoal};

/// Repository for savings goal persistence
pub struct GoalRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl GoalRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a new goal
    pub fn create(&self, new_goal: NewGoal) -> Result<Goal> {
        new_goal.validate()?;

        let mut goal_db: GoalDB = new_goal.into();
        goal_db.id = uuid::Uuid::new_v4().to_string();

        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(goals::table)
            .values(&goal_db)
            .execute(&mut conn)?;

        Goal::try_from(goal_db)
    }

    /// Updates a goal's name, description and target
    pub fn update(&self, update: GoalUpdate) -> Result<Goal> {
        update.validate()?;

        let mut conn = get_connection(&self.pool)?;

        diesel::update(goals::table.find(&update.id))
            .set((
                goals::name.eq(&update.name),
                goals::description.eq(&update.description),
                goals::target_amount.eq(update.target_amount.to_string()),
                goals::target_date.eq(update.target_date),
                goals::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        let updated = goals::table.find(&update.id).first::<GoalDB>(&mut conn)?;

        Goal::try_from(updated)
    }

    /// Retrieves a goal by its ID
    pub fn get_by_id(&self, goal_id: &str) -> Result<Goal> {
        let mut conn = get_connection(&self.pool)?;

        let goal = goals::table
            .find(goal_id)
            .first::<GoalDB>(&mut conn)
            .optional()?
            .ok_or_else(|| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "Goal with id {} not found",
                    goal_id
                )))
            })?;

        Goal::try_from(goal)
    }

    /// Lists goals with optional status and account filters
    pub fn list(
        &self,
        status_filter: Option<GoalStatus>,
        account_id_filter: Option<&str>,
    ) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = goals::table.filter(goals::is_active.eq(true)).into_boxed();

        if let Some(status) = status_filter {
            query = query.filter(goals::status.eq(status.as_str().to_string()));
        }
        if let Some(account) = account_id_filter {
            query = query.filter(goals::account_id.eq(account.to_string()));
        }

        let rows = query.order(goals::name.asc()).load::<GoalDB>(&mut conn)?;

        rows.into_iter().map(Goal::try_from).collect()
    }

    /// Persists a new saved amount
    pub fn set_current_amount(&self, goal_id: &str, amount: Decimal) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        diesel::update(goals::table.find(goal_id))
            .set((
                goals::current_amount.eq(amount.to_string()),
                goals::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    /// Moves a goal into a new lifecycle state. Entering `completed` stamps
    /// the completion time; leaving it clears the stamp.
    pub fn set_status(&self, goal_id: &str, status: GoalStatus) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        let completed_at = if status == GoalStatus::Completed {
            Some(chrono::Utc::now().naive_utc())
        } else {
            None
        };

        diesel::update(goals::table.find(goal_id))
            .set((
                goals::status.eq(status.as_str().to_string()),
                goals::completed_at.eq(completed_at),
                goals::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    /// Soft-deletes a goal by flagging it inactive
    pub fn deactivate(&self, goal_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        let affected = diesel::update(goals::table.find(goal_id))
            .set((
                goals::is_active.eq(false),
                goals::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        if affected == 0 {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Goal with id {} not found",
                goal_id
            ))));
        }

        Ok(())
    }
}
