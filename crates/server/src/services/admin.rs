//! Admin operations: catalog management, order status, dashboard.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use grocery_mart_core::{OrderId, OrderStatus, ProductId, UserId};

use super::{OrderService, ServiceError};
use crate::models::product::MAX_RATING;
use crate::models::{CustomerSummary, NewProduct, OrderView, Product, ProductPatch, User};
use crate::store::{OrderStore, ProductStore, Stores, UserStore};

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: u64,
    pub low_stock_count: u64,
    pub total_customers: u64,
    pub pending_orders: u64,
    pub deliveries_today: u64,
}

/// An order plus who placed it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderView {
    #[serde(flatten)]
    pub order: OrderView,
    pub customer: Option<CustomerSummary>,
}

/// Store administration.
pub struct AdminService {
    products: Arc<dyn ProductStore>,
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserStore>,
    order_views: OrderService,
}

impl AdminService {
    #[must_use]
    pub fn new(stores: &Stores) -> Self {
        Self {
            products: Arc::clone(&stores.products),
            orders: Arc::clone(&stores.orders),
            users: Arc::clone(&stores.users),
            order_views: OrderService::new(stores),
        }
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Dashboard counts. "Today" starts at UTC midnight.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if a store call fails.
    #[instrument(skip(self))]
    pub async fn dashboard(&self, low_stock_threshold: u32) -> Result<DashboardStats, ServiceError> {
        let midnight = start_of_day(Utc::now());

        Ok(DashboardStats {
            total_products: self.products.count().await?,
            low_stock_count: self.products.count_low_stock(low_stock_threshold).await?,
            total_customers: self.users.count_customers().await?,
            pending_orders: self.orders.count_by_status(OrderStatus::Pending).await?,
            deliveries_today: self
                .orders
                .count_by_status_since(OrderStatus::OutForDelivery, midnight)
                .await?,
        })
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Every product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.products.list_newest().await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for blank text fields or a rating
    /// outside 0..=5.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn add_product(&self, product: NewProduct) -> Result<Product, ServiceError> {
        require_text("name", &product.name)?;
        require_text("description", &product.description)?;
        check_rating(product.rating)?;

        let created = self.products.create(&product).await?;
        info!(product_id = %created.id, "Product added");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for invalid fields and
    /// `ServiceError::NotFound` if the product does not exist.
    #[instrument(skip(self, patch), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, ServiceError> {
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        if let Some(description) = &patch.description {
            require_text("description", description)?;
        }
        if let Some(rating) = patch.rating {
            check_rating(rating)?;
        }

        self.products
            .update(id, &patch)
            .await?
            .ok_or(ServiceError::NotFound("product"))
    }

    /// Delete a product. Existing orders keep their snapshots.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ServiceError> {
        if self.products.delete(id).await? {
            info!("Product deleted");
            Ok(())
        } else {
            Err(ServiceError::NotFound("product"))
        }
    }

    // =========================================================================
    // Users & orders
    // =========================================================================

    /// Customers (role `user`), newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the store fails.
    pub async fn list_customers(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.users.list_customers().await?)
    }

    /// All orders, newest first, each with a customer summary.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if a store call fails.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<AdminOrderView>, ServiceError> {
        let orders = self.orders.list(status).await?;

        let mut user_ids: Vec<UserId> = orders.iter().map(|o| o.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let customers: HashMap<UserId, CustomerSummary> = self
            .users
            .get_many(&user_ids)
            .await?
            .iter()
            .map(|u| (u.id, CustomerSummary::from(u)))
            .collect();

        let views = self.order_views.resolve(orders).await?;
        Ok(views
            .into_iter()
            .map(|order| AdminOrderView {
                customer: customers.get(&order.user_id).cloned(),
                order,
            })
            .collect())
    }

    /// Set an order's status. Any status may follow any other; moving to
    /// `Delivered` stamps the delivery date each time.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderView, ServiceError> {
        let delivered_at = (status == OrderStatus::Delivered).then(Utc::now);
        let order = self
            .orders
            .update_status(id, status, delivered_at)
            .await?
            .ok_or(ServiceError::NotFound("order"))?;
        info!("Order status updated");

        let mut views = self.order_views.resolve(vec![order]).await?;
        views.pop().ok_or(ServiceError::NotFound("order"))
    }
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(now, |midnight| midnight.and_utc())
}

fn require_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn check_rating(rating: Decimal) -> Result<(), ServiceError> {
    if rating < Decimal::ZERO || rating > MAX_RATING {
        return Err(ServiceError::Validation(
            "rating must be between 0 and 5".to_string(),
        ));
    }
    Ok(())
}
