//! In-memory implementation of every store trait.
//!
//! One mutex guards all collections, so each trait method is linearizable
//! and the conditional stock decrement is atomic. The lock is never held
//! across an `.await`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use grocery_mart_core::{Email, OrderId, OrderStatus, ProductId, Role, UserId};

use super::{CartStore, OrderStore, ProductStore, UserStore};
use crate::db::RepositoryError;
use crate::models::{
    Cart, NewOrder, NewProduct, NewUser, Order, Product, ProductFilter, ProductPatch, User,
};

#[derive(Debug, Default)]
struct State {
    next_product_id: i32,
    products: BTreeMap<ProductId, Product>,
    carts: HashMap<UserId, Cart>,
    next_order_id: i32,
    orders: BTreeMap<OrderId, Order>,
    next_user_id: i32,
    users: BTreeMap<UserId, User>,
}

impl State {
    fn allocate(counter: &mut i32) -> i32 {
        *counter += 1;
        *counter
    }
}

/// Process-local store. Cheap to create; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::DataCorruption("memory store lock poisoned".to_string()))
    }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let state = self.lock()?;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        products.truncate(filter.effective_limit());
        Ok(products)
    }

    async fn list_newest(&self) -> Result<Vec<Product>, RepositoryError> {
        let state = self.lock()?;
        let mut products: Vec<Product> = state.products.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(products)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let state = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let mut state = self.lock()?;
        let id = ProductId::new(State::allocate(&mut state.next_product_id));
        let now = Utc::now();
        let created = Product {
            id,
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category,
            price: product.price,
            stock: product.stock,
            image: product.image.clone(),
            unit: product.unit.clone(),
            rating: product.rating,
            created_at: now,
            updated_at: now,
        };
        state.products.insert(id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut state = self.lock()?;
        Ok(state.products.get_mut(&id).map(|product| {
            patch.apply(product);
            product.updated_at = Utc::now();
            product.clone()
        }))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.products.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let mut state = self.lock()?;
        let removed = state.products.len() as u64;
        state.products.clear();
        Ok(removed)
    }

    async fn try_decrement_stock(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.lock()?;
        match state.products.get_mut(&id) {
            Some(product) if product.stock >= quantity => {
                product.stock -= quantity;
                product.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_stock(&self, id: ProductId, quantity: u32) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        let product = state
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        product.stock = product.stock.saturating_add(quantity);
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.lock()?.products.len() as u64)
    }

    async fn count_low_stock(&self, threshold: u32) -> Result<u64, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .products
            .values()
            .filter(|p| p.stock < threshold)
            .count() as u64)
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let mut state = self.lock()?;
        Ok(state
            .carts
            .entry(user_id)
            .or_insert_with(|| Cart::empty(user_id))
            .clone())
    }

    async fn save(&self, cart: &Cart) -> Result<(), RepositoryError> {
        self.lock()?.carts.insert(cart.user_id, cart.clone());
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn next_id(&self) -> Result<OrderId, RepositoryError> {
        let mut state = self.lock()?;
        Ok(OrderId::new(State::allocate(&mut state.next_order_id)))
    }

    async fn insert(&self, id: OrderId, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut state = self.lock()?;
        if state.orders.contains_key(&id) {
            return Err(RepositoryError::Conflict(format!("order {id} already exists")));
        }
        let stored = order.into_order(id, Utc::now());
        state.orders.insert(id, stored.clone());
        Ok(stored)
    }

    async fn discard(&self, id: OrderId) -> Result<(), RepositoryError> {
        self.lock()?.orders.remove(&id);
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.lock()?.orders.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let state = self.lock()?;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let state = self.lock()?;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        delivered_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut state = self.lock()?;
        Ok(state.orders.get_mut(&id).map(|order| {
            order.status = status;
            if delivered_at.is_some() {
                order.delivery_date = delivered_at;
            }
            order.updated_at = Utc::now();
            order.clone()
        }))
    }

    async fn count_by_status(&self, status: OrderStatus) -> Result<u64, RepositoryError> {
        let state = self.lock()?;
        Ok(state.orders.values().filter(|o| o.status == status).count() as u64)
    }

    async fn count_by_status_since(
        &self,
        status: OrderStatus,
        since: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .orders
            .values()
            .filter(|o| o.status == status && o.order_date >= since)
            .count() as u64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.users.values().find(|u| &u.email == email).cloned())
    }

    async fn get_many(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError> {
        let state = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut state = self.lock()?;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_string()));
        }
        let id = UserId::new(State::allocate(&mut state.next_user_id));
        let created = User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role,
            address: user.address.clone(),
            created_at: Utc::now(),
        };
        state.users.insert(id, created.clone());
        Ok(created)
    }

    async fn list_customers(&self) -> Result<Vec<User>, RepositoryError> {
        let state = self.lock()?;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| u.role == Role::User)
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn count_customers(&self) -> Result<u64, RepositoryError> {
        let state = self.lock()?;
        Ok(state.users.values().filter(|u| u.role == Role::User).count() as u64)
    }
}
