//! Public catalog queries.

use std::sync::Arc;

use tracing::instrument;

use grocery_mart_core::ProductId;

use super::ServiceError;
use crate::models::{Product, ProductFilter};
use crate::store::{ProductStore, Stores};

/// Read-only access to the catalog.
pub struct CatalogService {
    products: Arc<dyn ProductStore>,
}

impl CatalogService {
    #[must_use]
    pub fn new(stores: &Stores) -> Self {
        Self {
            products: Arc::clone(&stores.products),
        }
    }

    /// List products matching the filter, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, ServiceError> {
        Ok(self.products.list(filter).await?)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.products
            .get(id)
            .await?
            .ok_or(ServiceError::NotFound("product"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use grocery_mart_core::Category;

    use super::*;
    use crate::services::test_support::{add_product, stores};

    #[tokio::test]
    async fn test_list_filters_by_search() {
        let (_, stores) = stores();
        add_product(&stores, "Tomato", Decimal::from(30), 10).await;
        add_product(&stores, "Potato", Decimal::from(25), 10).await;
        let catalog = CatalogService::new(&stores);

        let filter = ProductFilter {
            search: Some("TOM".to_string()),
            ..ProductFilter::default()
        };
        let found = catalog.list(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found.first().unwrap().name, "Tomato");

        let dairy = ProductFilter {
            category: Some(Category::Dairy),
            ..ProductFilter::default()
        };
        assert!(catalog.list(&dairy).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_, stores) = stores();
        let catalog = CatalogService::new(&stores);
        assert!(matches!(
            catalog.get(ProductId::new(404)).await,
            Err(ServiceError::NotFound("product"))
        ));
    }
}
