use chrono::Local;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::accounts::AccountRepository;
use crate::constants::NEAR_COMPLETION_THRESHOLD;
use crate::errors::{Error, Result, ValidationError};

use super::goals_model::{Goal, GoalStats, GoalStatus, GoalUpdate, NewGoal};
use super::goals_repository::GoalRepository;

/// Service for managing savings goals
pub struct GoalService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl GoalService {
    /// Creates a new GoalService instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Creates a goal tied to an active account
    pub fn create_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        AccountRepository::new(self.pool.clone()).get_active(&new_goal.account_id)?;
        GoalRepository::new(self.pool.clone()).create(new_goal)
    }

    /// Updates a goal's name, description and target. Lowering the target
    /// below the saved amount completes the goal.
    pub fn update_goal(&self, update: GoalUpdate) -> Result<Goal> {
        let repo = GoalRepository::new(self.pool.clone());
        let updated = repo.update(update)?;
        self.complete_if_reached(updated)
    }

    /// Retrieves a goal by its ID
    pub fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        GoalRepository::new(self.pool.clone()).get_by_id(goal_id)
    }

    /// Lists goals with optional status and account filters
    pub fn list_goals(
        &self,
        status: Option<GoalStatus>,
        account_id: Option<&str>,
    ) -> Result<Vec<Goal>> {
        GoalRepository::new(self.pool.clone()).list(status, account_id)
    }

    /// Soft-deletes a goal
    pub fn delete_goal(&self, goal_id: &str) -> Result<()> {
        GoalRepository::new(self.pool.clone()).deactivate(goal_id)
    }

    /// Pauses, resumes or cancels a goal
    pub fn set_goal_status(&self, goal_id: &str, status: GoalStatus) -> Result<Goal> {
        let repo = GoalRepository::new(self.pool.clone());
        repo.get_by_id(goal_id)?;
        repo.set_status(goal_id, status)?;
        repo.get_by_id(goal_id)
    }

    /// Adds a contribution to the saved amount. Negative contributions
    /// withdraw, but never below zero.
    pub fn add_contribution(&self, goal_id: &str, amount: Decimal) -> Result<Goal> {
        let goal = GoalRepository::new(self.pool.clone()).get_by_id(goal_id)?;

        if goal.status != GoalStatus::Active {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Goal '{}' is not active",
                goal.name
            ))));
        }

        let new_amount = (goal.current_amount + amount).max(Decimal::ZERO);
        self.update_progress(goal_id, new_amount)
    }

    /// Sets the saved amount outright, auto-completing the goal when it
    /// reaches the target
    pub fn update_progress(&self, goal_id: &str, current_amount: Decimal) -> Result<Goal> {
        if current_amount < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Saved amount cannot be negative".to_string(),
            )));
        }

        let repo = GoalRepository::new(self.pool.clone());
        repo.get_by_id(goal_id)?;
        repo.set_current_amount(goal_id, current_amount)?;

        let goal = repo.get_by_id(goal_id)?;
        self.complete_if_reached(goal)
    }

    fn complete_if_reached(&self, goal: Goal) -> Result<Goal> {
        if goal.status == GoalStatus::Active && goal.is_reached() {
            let repo = GoalRepository::new(self.pool.clone());
            repo.set_status(&goal.id, GoalStatus::Completed)?;
            debug!("Goal {} reached its target and was completed", goal.id);
            return repo.get_by_id(&goal.id);
        }
        Ok(goal)
    }

    /// Aggregate figures across all goals
    pub fn get_statistics(&self) -> Result<GoalStats> {
        let goals = GoalRepository::new(self.pool.clone()).list(None, None)?;

        let active_goals = goals
            .iter()
            .filter(|g| g.status == GoalStatus::Active)
            .count();
        let completed_goals = goals
            .iter()
            .filter(|g| g.status == GoalStatus::Completed)
            .count();
        let total_target_amount: Decimal = goals.iter().map(|g| g.target_amount).sum();
        let total_saved_amount: Decimal = goals.iter().map(|g| g.current_amount).sum();

        let overall_progress = if total_target_amount > Decimal::ZERO {
            (total_saved_amount / total_target_amount * Decimal::ONE_HUNDRED)
                .to_f64()
                .unwrap_or(0.0)
                .min(100.0)
        } else {
            0.0
        };

        Ok(GoalStats {
            total_goals: goals.len(),
            active_goals,
            completed_goals,
            total_target_amount,
            total_saved_amount,
            overall_progress,
        })
    }

    /// Active dated goals whose deadline has passed unmet
    pub fn get_overdue_goals(&self) -> Result<Vec<Goal>> {
        let today = Local::now().date_naive();
        let goals = GoalRepository::new(self.pool.clone()).list(Some(GoalStatus::Active), None)?;
        Ok(goals.into_iter().filter(|g| g.is_overdue(today)).collect())
    }

    /// Active goals close to their target but not yet there
    pub fn get_near_completion_goals(&self) -> Result<Vec<Goal>> {
        let goals = GoalRepository::new(self.pool.clone()).list(Some(GoalStatus::Active), None)?;
        Ok(goals
            .into_iter()
            .filter(|g| !g.is_reached() && g.progress_percentage() >= NEAR_COMPLETION_THRESHOLD)
            .collect())
    }
}
