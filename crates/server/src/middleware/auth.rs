//! Authentication extractors.
//!
//! Handlers name the access they need in their signature:
//!
//! ```rust,ignore
//! async fn get_cart(RequireUser(principal): RequireUser, ...) -> Result<...> { ... }
//! async fn dashboard(RequireAdmin(principal): RequireAdmin, ...) -> Result<...> { ... }
//! ```
//!
//! Both verify the `Authorization: Bearer` token and look the subject up in
//! the user directory. Failures render through [`AppError`].

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::services::{AuthError, Principal};
use crate::state::AppState;

/// Any authenticated user.
#[derive(Debug, Clone)]
pub struct RequireUser(pub Principal);

/// An authenticated user with the admin role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Principal);

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let (scheme, token) = header.split_once(' ').ok_or(AuthError::MissingToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token.trim())
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<Principal, AuthError> {
    let token = bearer_token(parts)?;
    let principal = state
        .tokens()
        .authenticate(state.stores().users.as_ref(), token)
        .await?;

    tracing::Span::current().record("user_id", principal.user_id.as_i32());
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(principal.user_id.to_string()),
            ..Default::default()
        }));
    });

    Ok(principal)
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state).await?))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let principal = authenticate(parts, state).await?;
        if !principal.is_admin() {
            tracing::warn!(user_id = %principal.user_id, path = %parts.uri.path(), "Admin route denied");
            return Err(AuthError::Forbidden.into());
        }
        Ok(Self(principal))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/cart");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (parts, ()) = builder.body(()).unwrap_or_default().into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def"))).ok(), Some("abc.def"));
        assert_eq!(bearer_token(&parts(Some("bearer abc"))).ok(), Some("abc"));
        assert!(bearer_token(&parts(None)).is_err());
        assert!(bearer_token(&parts(Some("Basic dXNlcg=="))).is_err());
        assert!(bearer_token(&parts(Some("Bearer "))).is_err());
    }
}
