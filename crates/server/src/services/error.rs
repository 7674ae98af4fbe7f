//! Service error types.

use thiserror::Error;

use grocery_mart_core::ProductId;

use crate::db::RepositoryError;
use crate::models::CartError;

/// Errors surfaced by the business services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Referenced entity does not exist (or is not visible to the caller).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Checkout was attempted with no cart lines.
    #[error("cart is empty")]
    EmptyCart,

    /// Not enough stock for a product.
    #[error("insufficient stock for {product_name}")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
    },

    /// Cart quantities must be at least 1.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The product is not in the cart.
    #[error("item not found in cart")]
    ItemNotFound,

    /// A store call failed or timed out during checkout; nothing was kept.
    #[error("transient store failure: {0}")]
    Transient(#[source] RepositoryError),

    /// Any other store failure.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<CartError> for ServiceError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::InvalidQuantity => Self::InvalidQuantity,
            CartError::ItemNotFound => Self::ItemNotFound,
        }
    }
}

impl From<grocery_mart_core::AddressError> for ServiceError {
    fn from(err: grocery_mart_core::AddressError) -> Self {
        Self::Validation(err.to_string())
    }
}
