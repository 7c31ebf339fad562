//! Product repository.

use async_trait::async_trait;
use sqlx::PgPool;

use storekeep_core::{CategoryId, Price, ProductId, ProductListing};

use super::RepositoryError;
use crate::models::Product;
use crate::services::catalog::ProductStore;

/// The six projected catalog columns.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    banner: String,
    category_id: CategoryId,
}

impl From<ProductRow> for ProductListing {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            banner: row.banner,
            category_id: row.category_id,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, product: &Product) -> Result<ProductListing, RepositoryError> {
        let row: ProductRow = sqlx::query_as(
            r"
            INSERT INTO products (id, name, price, description, banner, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, price, banner, category_id
            ",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.banner)
        .bind(&product.category_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "unknown category"))?;

        Ok(row.into())
    }
}

#[async_trait]
impl ProductStore for ProductRepository<'_> {
    async fn find_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<ProductListing>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, description, price, banner, category_id
            FROM products
            WHERE category_id = $1
            ",
        )
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductListing::from).collect())
    }
}
