//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors are rendered as
//! `{"error": "...", "kind": "..."}` where `kind` is a stable snake_case tag.
//! Server-side failures are captured to Sentry and never described to the
//! client.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, ServiceError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Business rule or store failure from a service.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Authentication or authorization failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Store failure outside a service call.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Malformed request (body, path or query).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unknown route or resource.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// JSON error envelope.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => match err {
                ServiceError::NotFound(_) | ServiceError::ItemNotFound => StatusCode::NOT_FOUND,
                ServiceError::Validation(_)
                | ServiceError::EmptyCart
                | ServiceError::InsufficientStock { .. }
                | ServiceError::InvalidQuantity => StatusCode::BAD_REQUEST,
                ServiceError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
                ServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::Forbidden => StatusCode::FORBIDDEN,
                AuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::UNAUTHORIZED,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Service(err) => match err {
                ServiceError::NotFound(_) => "not_found",
                ServiceError::Validation(_) => "validation",
                ServiceError::EmptyCart => "empty_cart",
                ServiceError::InsufficientStock { .. } => "insufficient_stock",
                ServiceError::InvalidQuantity => "invalid_quantity",
                ServiceError::ItemNotFound => "item_not_found",
                ServiceError::Transient(_) => "transient_store",
                ServiceError::Repository(_) => "internal",
            },
            Self::Auth(err) => match err {
                AuthError::Forbidden => "forbidden",
                AuthError::Repository(_) => "internal",
                _ => "unauthenticated",
            },
            Self::BadRequest(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Database(_) => "internal",
        }
    }

    /// Client-facing message. Internal details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            Self::Service(err) => match err {
                ServiceError::NotFound(what) => format!("{} not found", capitalize(what)),
                ServiceError::Validation(msg) => msg.clone(),
                ServiceError::InsufficientStock { product_name, .. } => {
                    format!("Insufficient stock for {product_name}")
                }
                ServiceError::EmptyCart => "Cart is empty".to_string(),
                ServiceError::InvalidQuantity => "Quantity must be at least 1".to_string(),
                ServiceError::ItemNotFound => "Item not found in cart".to_string(),
                ServiceError::Transient(_) => {
                    "Order could not be completed, please try again".to_string()
                }
                ServiceError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Auth(err) => match err {
                AuthError::Forbidden => "Admin access required".to_string(),
                AuthError::Repository(_) => "Internal server error".to_string(),
                _ => "Authentication required".to_string(),
            },
            Self::BadRequest(msg) => msg.clone(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Database(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.public_message(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use grocery_mart_core::ProductId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_service_error_status_codes() {
        assert_eq!(
            get_status(ServiceError::EmptyCart.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ServiceError::ItemNotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ServiceError::NotFound("order").into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ServiceError::Transient(RepositoryError::Timeout).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(ServiceError::Repository(RepositoryError::NotFound).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            get_status(AuthError::MissingToken.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::UnknownUser.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(get_status(AuthError::Forbidden.into()), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_kinds_and_messages() {
        let err = AppError::from(ServiceError::InsufficientStock {
            product_id: ProductId::new(3),
            product_name: "Basmati Rice".to_string(),
        });
        assert_eq!(err.kind(), "insufficient_stock");
        assert_eq!(err.public_message(), "Insufficient stock for Basmati Rice");

        let err = AppError::from(ServiceError::NotFound("product"));
        assert_eq!(err.public_message(), "Product not found");
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "invalid category in database: Gadgets".to_string(),
        ));
        assert_eq!(err.kind(), "internal");
        assert_eq!(err.public_message(), "Internal server error");
    }
}
