//! Category repository.

use sqlx::PgPool;

use storekeep_core::CategoryId;

use super::RepositoryError;
use crate::models::Category;

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, name: &str) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as(
            r"
            INSERT INTO categories (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at
            ",
        )
        .bind(CategoryId::generate())
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        Ok(category)
    }

    /// List every category, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as(
            r"
            SELECT id, name, created_at
            FROM categories
            ORDER BY created_at, name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }
}
