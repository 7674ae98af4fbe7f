//! Integration test harness for Grocery Mart.
//!
//! # Running Tests
//!
//! ```bash
//! # Router-level tests (in-memory store, no network)
//! cargo test -p grocery-mart-integration-tests
//!
//! # Live-server smoke tests
//! GROCERY_BASE_URL=http://localhost:3000 GROCERY_JWT_SECRET=... \
//!     cargo test -p grocery-mart-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] drives the real router with `tower::ServiceExt::oneshot` and
//! mints bearer tokens with the same secret the server verifies against.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use jsonwebtoken::{EncodingKey, Header, encode};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use grocery_mart_core::{Category, DeliveryAddress, Email, Price, Role};
use grocery_mart_server::config::ServerConfig;
use grocery_mart_server::models::{NewProduct, NewUser, Product, User};
use grocery_mart_server::state::AppState;
use grocery_mart_server::store::{MemoryStore, Stores};

/// Token secret used by every in-process test server.
pub const TEST_JWT_SECRET: &str = "kQ9#vT2!mX7@pL4$wR8^zN1&bF6*hJ3%";

const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// A router over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub stores: Stores,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let stores = Stores::memory(Arc::new(MemoryStore::new()));
        let config = ServerConfig::memory(SecretString::from(TEST_JWT_SECRET));
        let router = grocery_mart_server::app(AppState::new(config, stores.clone()));
        Self { router, stores }
    }

    /// Insert a product directly into the store.
    pub async fn product(&self, name: &str, price: i64, stock: u32) -> Product {
        self.product_in(name, Category::Vegetables, price, stock).await
    }

    pub async fn product_in(
        &self,
        name: &str,
        category: Category,
        price: i64,
        stock: u32,
    ) -> Product {
        self.stores
            .products
            .create(&NewProduct {
                name: name.to_string(),
                description: format!("Fresh {name}"),
                category,
                price: Price::new(Decimal::from(price)).unwrap(),
                stock,
                image: String::new(),
                unit: "kg".to_string(),
                rating: Decimal::ZERO,
            })
            .await
            .unwrap()
    }

    /// Register a user with a default address.
    pub async fn user(&self, email: &str, role: Role) -> User {
        self.stores
            .users
            .create(&NewUser {
                name: email.split('@').next().unwrap_or_default().to_string(),
                email: Email::parse(email).unwrap(),
                phone: Some("9812345678".to_string()),
                role,
                address: Some(address()),
            })
            .await
            .unwrap()
    }

    /// Register a user and return a bearer token for them.
    pub async fn login(&self, email: &str, role: Role) -> (User, String) {
        let user = self.user(email, role).await;
        let token = token_for(&user);
        (user, token)
    }

    pub async fn stock_of(&self, product: &Product) -> u32 {
        self.stores
            .products
            .get(product.id)
            .await
            .unwrap()
            .map_or(0, |p| p.stock)
    }

    /// Send a request and decode the JSON body (`Null` when empty).
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), MAX_RESPONSE_BYTES)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, path, Some(token), None).await
    }

    /// Add a product to the caller's cart, asserting success.
    pub async fn add_to_cart(&self, token: &str, product: &Product, quantity: u32) {
        let (status, body) = self
            .post(
                "/api/cart/add",
                token,
                json!({ "productId": product.id, "quantity": quantity }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "add to cart failed: {body}");
    }
}

#[must_use]
pub fn address() -> DeliveryAddress {
    DeliveryAddress {
        street: "12 MG Road".to_string(),
        city: "Pune".to_string(),
        state: "MH".to_string(),
        zip_code: "411001".to_string(),
    }
}

/// Mint an HS256 token for `user`, valid for an hour.
#[must_use]
pub fn token_for(user: &User) -> String {
    sign(
        &json!({
            "sub": user.id.to_string(),
            "role": user.role,
            "exp": expiry(3600),
        }),
        TEST_JWT_SECRET,
    )
}

/// Sign arbitrary claims.
#[must_use]
pub fn sign(claims: &Value, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Seconds since the epoch, offset by `seconds`.
#[must_use]
pub fn expiry(seconds: i64) -> i64 {
    chrono::Utc::now().timestamp() + seconds
}

/// Read a decimal that was serialized as a JSON string.
#[must_use]
pub fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_string)
        .parse()
        .unwrap()
}
