//! Bearer token verification.
//!
//! Tokens are issued by the identity service; this side only verifies them.
//! A valid signature is not enough: the subject must still exist in the user
//! directory, and the directory's role is the one that counts.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use grocery_mart_core::{Role, UserId};

use crate::db::RepositoryError;
use crate::store::UserStore;

/// Errors that can occur while authenticating a request.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer token on the request.
    #[error("missing bearer token")]
    MissingToken,

    /// Signature, expiry or claim validation failed.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// The token's subject is not a user id.
    #[error("malformed subject")]
    MalformedSubject,

    /// The token is valid but its user no longer exists.
    #[error("unknown user")]
    UnknownUser,

    /// Authenticated, but not allowed here.
    #[error("admin role required")]
    Forbidden,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a decimal string.
    pub sub: String,
    /// Role asserted by the issuer. Informational only.
    #[serde(default)]
    pub role: Option<Role>,
    /// Expiry (seconds since the epoch).
    pub exp: u64,
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenAuthority {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Check signature and expiry, returning the claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if verification fails.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(decode::<Claims>(token, &self.key, &self.validation)?.claims)
    }

    /// Verify a token and resolve its subject against the user directory.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` or `AuthError::MalformedSubject` for
    /// bad tokens, and `AuthError::UnknownUser` when the subject is gone.
    pub async fn authenticate(
        &self,
        users: &dyn UserStore,
        token: &str,
    ) -> Result<Principal, AuthError> {
        let claims = self.verify(token)?;
        let user_id: UserId = claims
            .sub
            .parse()
            .map_err(|_| AuthError::MalformedSubject)?;

        let user = users.get(user_id).await?.ok_or(AuthError::UnknownUser)?;
        if claims.role.is_some_and(|asserted| asserted != user.role) {
            debug!(user_id = %user_id, "Token role differs from directory role");
        }

        Ok(Principal {
            user_id: user.id,
            role: user.role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;
    use crate::services::test_support::{add_user, stores};

    const SECRET: &str = "t3st-K3y!9fQ#2vLm@8xRz$5wNp&1yHb";

    fn token(sub: &str, role: Option<Role>, exp: u64, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            role,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future() -> u64 {
        u64::try_from(chrono::Utc::now().timestamp()).unwrap() + 3600
    }

    #[tokio::test]
    async fn test_directory_role_wins() {
        let (_, stores) = stores();
        let user = add_user(&stores, "claim@example.com", Role::User).await;
        let authority = TokenAuthority::new(&SecretString::from(SECRET));

        // A token claiming admin still yields the stored role.
        let jwt = token(&user.id.to_string(), Some(Role::Admin), future(), SECRET);
        let principal = authority.authenticate(&*stores.users, &jwt).await.unwrap();
        assert_eq!(principal.user_id, user.id);
        assert!(!principal.is_admin());
    }

    #[tokio::test]
    async fn test_rejects_bad_tokens() {
        let (_, stores) = stores();
        let authority = TokenAuthority::new(&SecretString::from(SECRET));

        let wrong_key = token("1", None, future(), "another-K3y!9fQ#2vLm@8xRz$5wNp&1y");
        assert!(matches!(
            authority.authenticate(&*stores.users, &wrong_key).await,
            Err(AuthError::InvalidToken(_))
        ));

        let expired = token("1", None, 1_000_000, SECRET);
        assert!(matches!(
            authority.authenticate(&*stores.users, &expired).await,
            Err(AuthError::InvalidToken(_))
        ));

        let not_an_id = token("abc", None, future(), SECRET);
        assert!(matches!(
            authority.authenticate(&*stores.users, &not_an_id).await,
            Err(AuthError::MalformedSubject)
        ));

        let ghost = token("42", None, future(), SECRET);
        assert!(matches!(
            authority.authenticate(&*stores.users, &ghost).await,
            Err(AuthError::UnknownUser)
        ));
    }
}
