use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::errors::{Error, Result, ValidationError};
use crate::schema::categories;

use super::categories_model::{Category, NewCategory, UpdateCategory};

pub struct CategoryRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl CategoryRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        CategoryRepository { pool }
    }

    pub fn get_all(&self) -> Result<Vec<Category>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(categories::table
            .order(categories::name.asc())
            .load::<Category>(&mut conn)?)
    }

    pub fn get_by_id(&self, category_id: &str) -> Result<Option<Category>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(categories::table
            .find(category_id)
            .first::<Category>(&mut conn)
            .optional()?)
    }

    pub fn get_by_name(&self, category_name: &str) -> Result<Option<Category>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(categories::table
            .filter(categories::name.eq(category_name))
            .first::<Category>(&mut conn)
            .optional()?)
    }

    pub fn create(&self, new_category: NewCategory) -> Result<Category> {
        new_category.validate()?;

        let mut conn = get_connection(&self.pool)?;

        if self.get_by_name(&new_category.name)?.is_some() {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Category '{}' already exists",
                new_category.name
            ))));
        }

        let mut category = new_category;
        if category.id.is_none() {
            category.id = Some(Uuid::new_v4().to_string());
        }

        diesel::insert_into(categories::table)
            .values(&category)
            .execute(&mut conn)?;

        Ok(categories::table
            .find(category.id.unwrap_or_default())
            .first::<Category>(&mut conn)?)
    }

    pub fn update(&self, category_id: &str, update: UpdateCategory) -> Result<Category> {
        let mut conn = get_connection(&self.pool)?;

        let mut update = update;
        update.updated_at = Some(chrono::Utc::now().naive_utc());

        diesel::update(categories::table.find(category_id))
            .set(&update)
            .execute(&mut conn)?;

        Ok(categories::table
            .find(category_id)
            .first::<Category>(&mut conn)?)
    }

    pub fn delete(&self, category_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        Ok(diesel::delete(categories::table.find(category_id)).execute(&mut conn)?)
    }

    /// Looks up a category by name, creating it when absent. Runs on the
    /// caller's connection so it can take part in a larger transaction.
    pub fn get_or_create_with_conn(
        conn: &mut SqliteConnection,
        category_name: &str,
        description: Option<&str>,
        is_predefined: bool,
    ) -> Result<Category> {
        let existing = categories::table
            .filter(categories::name.eq(category_name))
            .first::<Category>(conn)
            .optional()?;

        if let Some(category) = existing {
            return Ok(category);
        }

        let new_category = NewCategory {
            id: Some(Uuid::new_v4().to_string()),
            name: category_name.to_string(),
            description: description.map(str::to_string),
            is_predefined,
        };

        diesel::insert_into(categories::table)
            .values(&new_category)
            .execute(conn)?;

        Ok(categories::table
            .find(new_category.id.unwrap_or_default())
            .first::<Category>(conn)?)
    }
}
