//! Order history for the owning user.

use std::sync::Arc;

use tracing::instrument;

use grocery_mart_core::{OrderId, ProductId, UserId};

use super::{ServiceError, product_map};
use crate::models::{Order, OrderView};
use crate::store::{OrderStore, ProductStore, Stores};

/// Read access to a user's own orders.
pub struct OrderService {
    products: Arc<dyn ProductStore>,
    orders: Arc<dyn OrderStore>,
}

impl OrderService {
    #[must_use]
    pub fn new(stores: &Stores) -> Self {
        Self {
            products: Arc::clone(&stores.products),
            orders: Arc::clone(&stores.orders),
        }
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if a store call fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn history(&self, user_id: UserId) -> Result<Vec<OrderView>, ServiceError> {
        let orders = self.orders.list_for_user(user_id).await?;
        self.resolve(orders).await
    }

    /// One order, only if it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the order does not exist or belongs
    /// to someone else.
    #[instrument(skip(self), fields(user_id = %user_id, order_id = %order_id))]
    pub async fn get(&self, user_id: UserId, order_id: OrderId) -> Result<OrderView, ServiceError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or(ServiceError::NotFound("order"))?;

        let mut views = self.resolve(vec![order]).await?;
        views.pop().ok_or(ServiceError::NotFound("order"))
    }

    /// Attach live products to a batch of orders.
    pub(crate) async fn resolve(&self, orders: Vec<Order>) -> Result<Vec<OrderView>, ServiceError> {
        let mut ids: Vec<ProductId> = orders
            .iter()
            .flat_map(|o| o.lines.iter().map(|l| l.product_id))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let products = product_map(self.products.as_ref(), &ids).await?;
        Ok(orders
            .into_iter()
            .map(|order| OrderView::resolve(order, &products))
            .collect())
    }
}
