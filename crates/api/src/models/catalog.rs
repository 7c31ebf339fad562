//! Category and product domain types.

use chrono::{DateTime, Utc};

use storekeep_core::{CategoryId, CategorySummary, Price, ProductId, ProductListing};

/// A product category.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategorySummary {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

/// A new product, validated and ready to insert.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// File name of the stored banner image.
    pub banner: String,
    pub category_id: CategoryId,
}

impl From<Product> for ProductListing {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            banner: product.banner,
            category_id: product.category_id,
        }
    }
}
