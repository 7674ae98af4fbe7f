//! Business logic services.
//!
//! # Services
//!
//! - `catalog` - Public product listing and lookup
//! - `cart` - Per-user cart editing with soft stock checks
//! - `checkout` - Turning a cart into an order with all-or-nothing stock reservation
//! - `orders` - Order history for the owning user
//! - `admin` - Catalog management, order status, dashboard counts
//! - `auth` - Bearer token verification
//!
//! Services hold `Arc` handles to the stores and are cheap to build per
//! request.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
mod error;
pub mod orders;

pub use admin::{AdminService, DashboardStats};
pub use auth::{AuthError, Claims, Principal, TokenAuthority};
pub use cart::CartService;
pub use catalog::CatalogService;
pub use checkout::{CheckoutService, PlaceOrder};
pub use error::ServiceError;
pub use orders::OrderService;

use std::collections::HashMap;

use grocery_mart_core::ProductId;

use crate::db::RepositoryError;
use crate::models::Product;
use crate::store::ProductStore;

/// Load the products referenced by `ids` into a lookup map.
pub(crate) async fn product_map(
    products: &dyn ProductStore,
    ids: &[ProductId],
) -> Result<HashMap<ProductId, Product>, RepositoryError> {
    Ok(products
        .get_many(ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    //! Fixtures shared by the service tests.

    use std::sync::Arc;

    use rust_decimal::Decimal;

    use grocery_mart_core::{Category, DeliveryAddress, Email, Price, Role};

    use crate::models::{NewProduct, NewUser, Product, User};
    use crate::store::{MemoryStore, ProductStore, Stores, UserStore};

    pub(crate) fn stores() -> (Arc<MemoryStore>, Stores) {
        let memory = Arc::new(MemoryStore::new());
        let stores = Stores::memory(Arc::clone(&memory));
        (memory, stores)
    }

    pub(crate) fn address() -> DeliveryAddress {
        DeliveryAddress {
            street: "4 Station Road".to_string(),
            city: "Nagpur".to_string(),
            state: "MH".to_string(),
            zip_code: "440001".to_string(),
        }
    }

    pub(crate) async fn add_product(
        stores: &Stores,
        name: &str,
        price: Decimal,
        stock: u32,
    ) -> Product {
        stores
            .products
            .create(&NewProduct {
                name: name.to_string(),
                description: format!("{name} from the farm"),
                category: Category::Vegetables,
                price: Price::new(price).unwrap(),
                stock,
                image: String::new(),
                unit: "kg".to_string(),
                rating: Decimal::ZERO,
            })
            .await
            .unwrap()
    }

    pub(crate) async fn add_user(stores: &Stores, email: &str, role: Role) -> User {
        UserStore::create(
            &*stores.users,
            &NewUser {
                name: email.split('@').next().unwrap_or_default().to_string(),
                email: Email::parse(email).unwrap(),
                phone: Some("9800000000".to_string()),
                role,
                address: Some(address()),
            },
        )
        .await
        .unwrap()
    }

    pub(crate) async fn stock_of(stores: &Stores, product: &Product) -> u32 {
        ProductStore::get(&*stores.products, product.id)
            .await
            .unwrap()
            .unwrap()
            .stock
    }
}
