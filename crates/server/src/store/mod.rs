//! Storage seams for the catalog, carts, orders and users.
//!
//! Services depend on these traits only. Two backends implement them:
//! [`crate::db`] (`PostgreSQL`) and [`memory::MemoryStore`] (tests and
//! local demos).
//!
//! Every method is a single store call. The one contract that matters for
//! correctness is [`ProductStore::try_decrement_stock`], which must apply
//! `stock >= quantity` and `stock -= quantity` as one indivisible step.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use grocery_mart_core::{Email, OrderId, OrderStatus, ProductId, UserId};

use crate::db::{
    CartRepository, OrderRepository, ProductRepository, RepositoryError, UserRepository,
};
use crate::models::{Cart, NewOrder, NewProduct, NewUser, Order, Product, ProductFilter, ProductPatch, User};

pub use memory::MemoryStore;

/// Catalog and stock storage.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Products matching the filter, sorted by name, limited.
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError>;

    /// Every product, newest first (admin listing).
    async fn list_newest(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// The products that exist among `ids`, in no particular order.
    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError>;

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError>;

    /// Apply a partial update. Returns `None` if the product does not exist.
    async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Returns whether a product was deleted.
    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// Remove every product. Used by the seeder.
    async fn delete_all(&self) -> Result<u64, RepositoryError>;

    /// Atomically decrement stock by `quantity` only if `stock >= quantity`.
    ///
    /// Returns `false` (and changes nothing) when stock is short or the
    /// product no longer exists.
    async fn try_decrement_stock(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError>;

    /// Put stock back. Only used to compensate a failed checkout.
    async fn increment_stock(&self, id: ProductId, quantity: u32) -> Result<(), RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Products with `stock < threshold`.
    async fn count_low_stock(&self, threshold: u32) -> Result<u64, RepositoryError>;
}

/// Per-user cart storage.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The user's cart, created empty on first access.
    async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError>;

    /// Persist the whole cart (last write wins).
    async fn save(&self, cart: &Cart) -> Result<(), RepositoryError>;
}

/// Order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Reserve an id for an order that has not been inserted yet.
    async fn next_id(&self) -> Result<OrderId, RepositoryError>;

    /// Store `order` under an id obtained from [`OrderStore::next_id`].
    async fn insert(&self, id: OrderId, order: NewOrder) -> Result<Order, RepositoryError>;

    /// Delete an order that was inserted by a checkout which later failed.
    async fn discard(&self, id: OrderId) -> Result<(), RepositoryError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// A user's orders, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// All orders, newest first, optionally filtered by status.
    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError>;

    /// Set the status. `delivered_at` (when given) is stored as the delivery date.
    ///
    /// Returns `None` if the order does not exist.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        delivered_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Order>, RepositoryError>;

    async fn count_by_status(&self, status: OrderStatus) -> Result<u64, RepositoryError>;

    /// Orders in `status` placed at or after `since`.
    async fn count_by_status_since(
        &self,
        status: OrderStatus,
        since: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;
}

/// User directory.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError>;

    /// Insert a user. Fails with `Conflict` when the email is taken.
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// Users with the `user` role, newest first.
    async fn list_customers(&self) -> Result<Vec<User>, RepositoryError>;

    async fn count_customers(&self) -> Result<u64, RepositoryError>;
}

/// The full set of stores a server instance runs against.
#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn ProductStore>,
    pub carts: Arc<dyn CartStore>,
    pub orders: Arc<dyn OrderStore>,
    pub users: Arc<dyn UserStore>,
    pool: Option<PgPool>,
}

impl Stores {
    /// Stores backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            products: Arc::new(ProductRepository::new(pool.clone())),
            carts: Arc::new(CartRepository::new(pool.clone())),
            orders: Arc::new(OrderRepository::new(pool.clone())),
            users: Arc::new(UserRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Stores backed by a shared in-memory store.
    #[must_use]
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            products: store.clone(),
            carts: store.clone(),
            orders: store.clone(),
            users: store,
            pool: None,
        }
    }

    /// The database pool, when running against `PostgreSQL`.
    #[must_use]
    pub const fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Check the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if `PostgreSQL` does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}
