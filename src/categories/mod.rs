pub(crate) mod categories_model;
pub(crate) mod categories_repository;
pub(crate) mod categories_service;

pub use categories_model::{Category, NewCategory, UpdateCategory};
pub use categories_repository::CategoryRepository;
pub use categories_service::CategoryService;
