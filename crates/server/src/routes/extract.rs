//! Request extractors whose rejections render as [`AppError`].
//!
//! Axum's own extractors answer malformed input with plain-text bodies; these
//! wrappers keep every error in the JSON envelope with kind `validation`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;
use crate::services::ServiceError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

/// URL path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// Parse a client-supplied quantity, rejecting anything below 1.
pub fn quantity(value: i64) -> Result<u32, ServiceError> {
    if value < 1 {
        return Err(ServiceError::InvalidQuantity);
    }
    u32::try_from(value).map_err(|_| ServiceError::Validation("quantity is too large".to_string()))
}
