//! Category commands.
//!
//! # Usage
//!
//! ```bash
//! storekeep category create -n Pizzas
//! ```

use thiserror::Error;

use storekeep_api::db::RepositoryError;
use storekeep_api::db::categories::CategoryRepository;

/// Errors that can occur during category operations.
#[derive(Debug, Error)]
pub enum CategoryError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: API_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Blank name.
    #[error("Category name is required")]
    MissingName,
}

/// Create a category.
///
/// # Errors
///
/// Returns `CategoryError` if the name is blank or the insert fails.
pub async fn create(name: &str) -> Result<String, CategoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CategoryError::MissingName);
    }

    let pool = super::connect()
        .await
        .ok_or(CategoryError::MissingDatabaseUrl)??;

    let category = CategoryRepository::new(&pool).create(name).await?;

    tracing::info!("Category created! ID: {}, Name: {}", category.id, category.name);
    Ok(category.id.to_string())
}
