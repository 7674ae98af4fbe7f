//! Cart operations.
//!
//! Stock checks here are advisory only. The authoritative check happens at
//! checkout, inside the conditional decrement.

use std::sync::Arc;

use tracing::{debug, instrument};

use grocery_mart_core::{ProductId, UserId};

use super::ServiceError;
use crate::models::{Cart, CartView};
use crate::store::{CartStore, ProductStore, Stores};

/// Edits a user's cart.
pub struct CartService {
    products: Arc<dyn ProductStore>,
    carts: Arc<dyn CartStore>,
}

impl CartService {
    #[must_use]
    pub fn new(stores: &Stores) -> Self {
        Self {
            products: Arc::clone(&stores.products),
            carts: Arc::clone(&stores.carts),
        }
    }

    /// The user's cart joined with current products.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if a store call fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartView, ServiceError> {
        let cart = self.carts.get_or_create(user_id).await?;
        self.view(&cart).await
    }

    /// Add a product, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidQuantity` for a zero quantity,
    /// `ServiceError::NotFound` for an unknown product, and
    /// `ServiceError::InsufficientStock` if more is requested than is in stock.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, ServiceError> {
        if quantity == 0 {
            return Err(ServiceError::InvalidQuantity);
        }
        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or(ServiceError::NotFound("product"))?;
        if quantity > product.stock {
            return Err(ServiceError::InsufficientStock {
                product_id,
                product_name: product.name,
            });
        }

        let mut cart = self.carts.get_or_create(user_id).await?;
        cart.add(product_id, quantity)?;
        self.carts.save(&cart).await?;
        debug!(quantity, "Added to cart");

        self.view(&cart).await
    }

    /// Remove a product's line. Removing an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if a store call fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartView, ServiceError> {
        let mut cart = self.carts.get_or_create(user_id).await?;
        if cart.remove(product_id) {
            self.carts.save(&cart).await?;
        }
        self.view(&cart).await
    }

    /// Overwrite the quantity of a line already in the cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidQuantity` for zero and
    /// `ServiceError::ItemNotFound` if the product is not in the cart.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, ServiceError> {
        let mut cart = self.carts.get_or_create(user_id).await?;
        cart.set_quantity(product_id, quantity)?;
        self.carts.save(&cart).await?;
        self.view(&cart).await
    }

    async fn view(&self, cart: &Cart) -> Result<CartView, ServiceError> {
        let ids: Vec<ProductId> = cart.lines.iter().map(|l| l.product_id).collect();
        let products = if ids.is_empty() {
            Vec::new()
        } else {
            self.products.get_many(&ids).await?
        };
        Ok(CartView::resolve(cart, &products))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::services::test_support::{add_product, stores};

    const USER: UserId = UserId::new(1);

    #[tokio::test]
    async fn test_add_merges_and_sums() {
        let (_, stores) = stores();
        let onion = add_product(&stores, "Onion", Decimal::new(4050, 2), 20).await;
        let service = CartService::new(&stores);

        service.add_item(USER, onion.id, 1).await.unwrap();
        let view = service.add_item(USER, onion.id, 2).await.unwrap();

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, Decimal::new(12150, 2));
    }

    #[tokio::test]
    async fn test_add_rejects_bad_requests() {
        let (_, stores) = stores();
        let garlic = add_product(&stores, "Garlic", Decimal::from(10), 2).await;
        let service = CartService::new(&stores);

        assert!(matches!(
            service.add_item(USER, garlic.id, 0).await,
            Err(ServiceError::InvalidQuantity)
        ));
        assert!(matches!(
            service.add_item(USER, ProductId::new(77), 1).await,
            Err(ServiceError::NotFound("product"))
        ));
        assert!(matches!(
            service.add_item(USER, garlic.id, 3).await,
            Err(ServiceError::InsufficientStock { .. })
        ));
        assert!(service.get_cart(USER).await.unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_remove_absent_product_leaves_cart_unchanged() {
        let (_, stores) = stores();
        let ginger = add_product(&stores, "Ginger", Decimal::from(15), 5).await;
        let service = CartService::new(&stores);
        service.add_item(USER, ginger.id, 2).await.unwrap();

        let before = stores.carts.get_or_create(USER).await.unwrap();
        service.remove_item(USER, ProductId::new(999)).await.unwrap();
        service.remove_item(USER, ProductId::new(999)).await.unwrap();
        let after = stores.carts.get_or_create(USER).await.unwrap();
        assert_eq!(before, after);

        let emptied = service.remove_item(USER, ginger.id).await.unwrap();
        assert!(emptied.items.is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_on_missing_line() {
        let (_, stores) = stores();
        let peas = add_product(&stores, "Peas", Decimal::from(60), 5).await;
        let beans = add_product(&stores, "Beans", Decimal::from(45), 5).await;
        let service = CartService::new(&stores);
        service.add_item(USER, peas.id, 1).await.unwrap();

        let before = stores.carts.get_or_create(USER).await.unwrap();
        assert!(matches!(
            service.set_quantity(USER, beans.id, 2).await,
            Err(ServiceError::ItemNotFound)
        ));
        assert!(matches!(
            service.set_quantity(USER, peas.id, 0).await,
            Err(ServiceError::InvalidQuantity)
        ));
        assert_eq!(stores.carts.get_or_create(USER).await.unwrap(), before);

        let view = service.set_quantity(USER, peas.id, 4).await.unwrap();
        assert_eq!(view.item_count, 4);
    }

    #[tokio::test]
    async fn test_view_omits_deleted_products() {
        let (_, stores) = stores();
        let okra = add_product(&stores, "Okra", Decimal::from(35), 5).await;
        let service = CartService::new(&stores);
        service.add_item(USER, okra.id, 1).await.unwrap();

        stores.products.delete(okra.id).await.unwrap();
        let view = service.get_cart(USER).await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.subtotal, Decimal::ZERO);
    }
}
