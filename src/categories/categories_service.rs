use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::errors::{Error, Result, ValidationError};

use super::categories_model::{Category, NewCategory, UpdateCategory};
use super::categories_repository::CategoryRepository;

/// Service for managing spending/income categories
pub struct CategoryService {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl CategoryService {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn get_categories(&self) -> Result<Vec<Category>> {
        CategoryRepository::new(self.pool.clone()).get_all()
    }

    pub fn get_category(&self, category_id: &str) -> Result<Option<Category>> {
        CategoryRepository::new(self.pool.clone()).get_by_id(category_id)
    }

    pub fn create_category(&self, new_category: NewCategory) -> Result<Category> {
        CategoryRepository::new(self.pool.clone()).create(new_category)
    }

    pub fn update_category(&self, category_id: &str, update: UpdateCategory) -> Result<Category> {
        let repo = CategoryRepository::new(self.pool.clone());
        let existing = repo.get_by_id(category_id)?.ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "Category with id {} not found",
                category_id
            )))
        })?;

        if existing.is_predefined {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Predefined categories cannot be modified".to_string(),
            )));
        }

        repo.update(category_id, update)
    }

    /// Deletes a category. Predefined categories are protected.
    pub fn delete_category(&self, category_id: &str) -> Result<()> {
        let repo = CategoryRepository::new(self.pool.clone());
        let existing = repo.get_by_id(category_id)?.ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "Category with id {} not found",
                category_id
            )))
        })?;

        if existing.is_predefined {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Predefined categories cannot be deleted".to_string(),
            )));
        }

        repo.delete(category_id)?;
        Ok(())
    }
}
