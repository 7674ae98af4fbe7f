//! Checkout: turn a user's cart into an order.
//!
//! All validation happens before the first write. The write phase then
//! reserves stock line by line with the store's conditional decrement. If a
//! decrement is refused, or any store call fails or times out, every
//! reservation made so far is released before the error is returned, so the
//! caller sees either a complete order or no change at all.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use grocery_mart_core::{DeliveryAddress, OrderId, PaymentMethod, ProductId, UserId};

use super::{ServiceError, product_map};
use crate::db::RepositoryError;
use crate::models::{Cart, NewOrder, OrderLine, OrderView};
use crate::store::{CartStore, OrderStore, ProductStore, Stores, UserStore};

/// A validated order request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceOrder {
    /// Overrides the user's default address when present.
    pub delivery_address: Option<DeliveryAddress>,
    pub payment_method: PaymentMethod,
}

/// Stock taken by the write phase so far, in the order it was taken.
#[derive(Debug, Default)]
struct Reservation {
    taken: Vec<(ProductId, u32)>,
}

/// Places orders.
#[derive(Clone)]
pub struct CheckoutService {
    products: Arc<dyn ProductStore>,
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserStore>,
    store_timeout: Duration,
}

impl CheckoutService {
    /// `store_timeout` bounds each store call in the write phase.
    #[must_use]
    pub fn new(stores: &Stores, store_timeout: Duration) -> Self {
        Self {
            products: Arc::clone(&stores.products),
            carts: Arc::clone(&stores.carts),
            orders: Arc::clone(&stores.orders),
            users: Arc::clone(&stores.users),
            store_timeout,
        }
    }

    /// Place an order for everything in the user's cart.
    ///
    /// On success the order is stored as `Pending`, stock is reduced for every
    /// line and the cart is empty.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::EmptyCart`, `ServiceError::NotFound` (a cart line
    /// refers to a deleted product), `ServiceError::Validation` (no usable
    /// address) or `ServiceError::InsufficientStock` without changing anything.
    /// Returns `ServiceError::Transient` if a store call fails or times out
    /// during the write phase; reservations are released and any order row
    /// already written under the reserved id is discarded first. A stock
    /// decrement that times out is not released, because its outcome is
    /// unknown; it is logged at `error` for reconciliation.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: PlaceOrder,
    ) -> Result<OrderView, ServiceError> {
        let cart = self.carts.get_or_create(user_id).await?;
        if cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }

        let lines = self.snapshot_lines(&cart).await?;
        let delivery_address = self
            .resolve_address(user_id, request.delivery_address)
            .await?;
        let order = NewOrder::new(user_id, lines, delivery_address, request.payment_method);

        // Write phase.
        let reservation = self.reserve(order.lines()).await?;

        let order_id = match self.bounded(self.orders.next_id()).await {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "Order id allocation failed");
                self.release(reservation).await;
                return Err(ServiceError::Transient(err));
            }
        };

        // The insert may have landed even when the call fails or times out.
        let placed = match self.bounded(self.orders.insert(order_id, order)).await {
            Ok(placed) => placed,
            Err(err) => {
                warn!(order_id = %order_id, error = %err, "Order insert failed, discarding order");
                self.discard(order_id).await;
                self.release(reservation).await;
                return Err(ServiceError::Transient(err));
            }
        };

        let mut emptied = cart;
        emptied.clear();
        if let Err(err) = self.bounded(self.carts.save(&emptied)).await {
            warn!(order_id = %placed.id, error = %err, "Cart clear failed, discarding order");
            self.discard(placed.id).await;
            self.release(reservation).await;
            return Err(ServiceError::Transient(err));
        }

        info!(
            order_id = %placed.id,
            total = %placed.total_amount,
            lines = placed.lines.len(),
            "Order placed"
        );

        let ids: Vec<ProductId> = placed.lines.iter().map(|l| l.product_id).collect();
        let products = match product_map(self.products.as_ref(), &ids).await {
            Ok(products) => products,
            Err(err) => {
                // The order stands; it is just shown without live products.
                warn!(order_id = %placed.id, error = %err, "Could not load products for order view");
                HashMap::new()
            }
        };
        Ok(OrderView::resolve(placed, &products))
    }

    /// Resolve cart lines to products and check stock, without writing.
    async fn snapshot_lines(&self, cart: &Cart) -> Result<Vec<OrderLine>, ServiceError> {
        let ids: Vec<ProductId> = cart.lines.iter().map(|l| l.product_id).collect();
        let products = product_map(self.products.as_ref(), &ids).await?;

        let mut lines = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let product = products
                .get(&line.product_id)
                .ok_or(ServiceError::NotFound("product"))?;
            if line.quantity > product.stock {
                info!(product_id = %product.id, requested = line.quantity, stock = product.stock, "Insufficient stock");
                return Err(ServiceError::InsufficientStock {
                    product_id: product.id,
                    product_name: product.name.clone(),
                });
            }
            lines.push(OrderLine::snapshot(product, line.quantity));
        }
        Ok(lines)
    }

    async fn resolve_address(
        &self,
        user_id: UserId,
        requested: Option<DeliveryAddress>,
    ) -> Result<DeliveryAddress, ServiceError> {
        let address = match requested.filter(|a| !a.is_blank()) {
            Some(address) => address,
            None => self
                .users
                .get(user_id)
                .await?
                .and_then(|user| user.address)
                .filter(|a| !a.is_blank())
                .ok_or_else(|| ServiceError::Validation("delivery address is required".to_string()))?,
        };
        address.validate()?;
        Ok(address)
    }

    /// Take stock for every line, releasing everything on the first failure.
    async fn reserve(&self, lines: &[OrderLine]) -> Result<Reservation, ServiceError> {
        let mut reservation = Reservation::default();

        for line in lines {
            let outcome = self
                .bounded(self.products.try_decrement_stock(line.product_id, line.quantity))
                .await;
            match outcome {
                Ok(true) => reservation.taken.push((line.product_id, line.quantity)),
                Ok(false) => {
                    info!(product_id = %line.product_id, quantity = line.quantity, "Stock decrement refused");
                    self.release(reservation).await;
                    return Err(ServiceError::InsufficientStock {
                        product_id: line.product_id,
                        product_name: line.name.clone(),
                    });
                }
                Err(err) => {
                    if matches!(err, RepositoryError::Timeout) {
                        // Not released: it may or may not have been applied.
                        error!(
                            product_id = %line.product_id,
                            quantity = line.quantity,
                            at = %Utc::now(),
                            "Stock decrement timed out, outcome unknown; reconcile stock"
                        );
                    }
                    self.release(reservation).await;
                    return Err(ServiceError::Transient(err));
                }
            }
        }

        Ok(reservation)
    }

    /// Remove an order written by this checkout. Failures are logged, not returned.
    async fn discard(&self, order_id: OrderId) {
        if let Err(err) = self.bounded(self.orders.discard(order_id)).await {
            error!(
                order_id = %order_id,
                error = %err,
                at = %Utc::now(),
                "Failed to discard order during rollback"
            );
        }
    }

    /// Give back reserved stock, newest first. Failures are logged, not returned.
    async fn release(&self, reservation: Reservation) {
        if reservation.taken.is_empty() {
            return;
        }
        warn!(lines = reservation.taken.len(), "Rolling back stock reservation");

        for (product_id, quantity) in reservation.taken.into_iter().rev() {
            if let Err(err) = self
                .bounded(self.products.increment_stock(product_id, quantity))
                .await
            {
                error!(
                    product_id = %product_id,
                    quantity,
                    error = %err,
                    at = %Utc::now(),
                    "Failed to restore stock during rollback"
                );
            }
        }
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, RepositoryError>
    where
        F: Future<Output = Result<T, RepositoryError>>,
    {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| RepositoryError::Timeout)?
    }
}
