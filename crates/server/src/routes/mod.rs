//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                           - Liveness
//! GET    /health/ready                     - Readiness (store ping)
//!
//! # Catalog (public)
//! GET    /api/products                     - List/search (?category=&search=&limit=)
//! GET    /api/products/{id}                - Product detail
//!
//! # Cart (user)
//! GET    /api/cart                         - Current cart
//! POST   /api/cart/add                     - Add item
//! POST   /api/cart/remove                  - Remove item
//! PUT    /api/cart/update                  - Set quantity
//!
//! # Orders (user)
//! POST   /api/order/create                 - Checkout
//! GET    /api/order/history                - Own orders, newest first
//! GET    /api/order/{id}                   - Own order
//!
//! # Admin (admin)
//! GET    /api/admin/dashboard              - Dashboard counts
//! GET    /api/admin/products               - All products, newest first
//! POST   /api/admin/products/add           - Create product
//! PUT    /api/admin/products/update/{id}   - Update product
//! DELETE /api/admin/products/delete/{id}   - Delete product
//! GET    /api/admin/users                  - Customers
//! GET    /api/admin/orders                 - Orders (?status=)
//! PUT    /api/admin/orders/{id}/status     - Set order status
//! ```

pub mod admin;
pub mod cart;
pub mod extract;
pub mod health;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::error::AppError;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/update", put(cart::update))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/create", post(orders::create))
        .route("/history", get(orders::history))
        .route("/{id}", get(orders::show))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/products", get(admin::products))
        .route("/products/add", post(admin::add_product))
        .route("/products/update/{id}", put(admin::update_product))
        .route("/products/delete/{id}", delete(admin::delete_product))
        .route("/users", get(admin::users))
        .route("/orders", get(admin::orders))
        .route("/orders/{id}/status", put(admin::update_order_status))
}

/// Create all `/api` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/order", order_routes())
        .nest("/admin", admin_routes())
        .fallback(api_not_found)
}

/// Unknown `/api` paths answer in the JSON envelope.
async fn api_not_found() -> AppError {
    AppError::NotFound("Route".to_string())
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes())
}
