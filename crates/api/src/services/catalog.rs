//! Catalog queries.

use async_trait::async_trait;
use tracing::instrument;

use storekeep_core::ProductListing;

use crate::db::RepositoryError;

/// Read access to stored products.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products whose category is exactly `category_id`, projected to the
    /// six catalog fields. Order is whatever the store yields.
    async fn find_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<ProductListing>, RepositoryError>;
}

/// Lists the products of one category.
///
/// The identifier is not validated: an unknown or malformed identifier yields
/// an empty list rather than an error.
pub struct ListByCategoryService<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: ProductStore + ?Sized> ListByCategoryService<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Run the lookup.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` only if the store itself fails.
    #[instrument(skip(self))]
    pub async fn execute(&self, category_id: &str) -> Result<Vec<ProductListing>, RepositoryError> {
        let products = self.store.find_by_category(category_id).await?;
        tracing::debug!(count = products.len(), "products listed by category");
        Ok(products)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use storekeep_core::{CategoryId, Price, ProductId};

    struct InMemoryProducts(Vec<ProductListing>);

    #[async_trait]
    impl ProductStore for InMemoryProducts {
        async fn find_by_category(
            &self,
            category_id: &str,
        ) -> Result<Vec<ProductListing>, RepositoryError> {
            Ok(self
                .0
                .iter()
                .filter(|p| p.category_id.as_str() == category_id)
                .cloned()
                .collect())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl ProductStore for BrokenStore {
        async fn find_by_category(&self, _: &str) -> Result<Vec<ProductListing>, RepositoryError> {
            Err(RepositoryError::DataCorruption("disk on fire".into()))
        }
    }

    fn product(name: &str, category: &str) -> ProductListing {
        ProductListing {
            id: ProductId::generate(),
            name: name.to_string(),
            description: format!("{name} description"),
            price: Price::parse("25.00").unwrap(),
            banner: format!("{name}.png"),
            category_id: CategoryId::new(category),
        }
    }

    fn store() -> InMemoryProducts {
        InMemoryProducts(vec![
            product("margherita", "X"),
            product("coke", "drinks"),
            product("calabresa", "X"),
            product("juice", "drinks"),
            product("portuguesa", "X"),
        ])
    }

    #[tokio::test]
    async fn test_returns_only_matching_category() {
        let store = store();
        let products = ListByCategoryService::new(&store).execute("X").await.unwrap();

        assert_eq!(products.len(), 3);
        assert!(products.iter().all(|p| p.category_id.as_str() == "X"));
    }

    #[tokio::test]
    async fn test_unknown_category_is_empty_not_error() {
        let store = store();
        let products = ListByCategoryService::new(&store)
            .execute("no-such-category")
            .await
            .unwrap();

        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let result = ListByCategoryService::new(&BrokenStore).execute("X").await;
        assert!(matches!(result, Err(RepositoryError::DataCorruption(_))));
    }
}
