pub mod db;

pub mod accounts;
pub mod budgets;
pub mod categories;
pub mod constants;
pub mod errors;
pub mod goals;
pub mod imports;
pub mod recurring;
pub mod schema;
pub mod transactions;
pub mod transfers;

pub use errors::{Error, Result};
