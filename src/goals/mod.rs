// Module declarations
pub(crate) mod goals_model;
pub(crate) mod goals_repository;
pub(crate) mod goals_service;

// Re-export the public interface
pub use goals_model::{Goal, GoalDB, GoalStats, GoalStatus, GoalType, GoalUpdate, NewGoal};
pub use goals_repository::GoalRepository;
pub use goals_service::GoalService;
