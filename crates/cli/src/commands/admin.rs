//! Admin user management.
//!
//! Only the directory record is created. Tokens for the new user are issued
//! by the identity provider that shares `GROCERY_JWT_SECRET`.

use grocery_mart_core::{Email, Role};
use grocery_mart_server::models::{NewUser, User};
use grocery_mart_server::store::{Stores, UserStore};

use super::{CommandError, connect};

/// Result of [`ensure_admin`].
#[derive(Debug)]
pub enum AdminOutcome {
    Created(User),
    /// A user with the email already exists; it is left untouched.
    Exists(User),
}

/// Create an admin unless the email is already registered.
pub async fn ensure_admin(
    users: &dyn UserStore,
    email: &str,
    name: &str,
) -> Result<AdminOutcome, CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::Invalid("name must not be empty".to_string()));
    }

    if let Some(existing) = users.get_by_email(&email).await? {
        return Ok(AdminOutcome::Exists(existing));
    }

    let user = users
        .create(&NewUser {
            name: name.to_string(),
            email,
            phone: None,
            role: Role::Admin,
            address: None,
        })
        .await?;

    Ok(AdminOutcome::Created(user))
}

/// `gm-cli admin create`
pub async fn create(email: &str, name: &str) -> Result<(), CommandError> {
    let stores = Stores::postgres(connect().await?);

    match ensure_admin(stores.users.as_ref(), email, name).await? {
        AdminOutcome::Created(user) => {
            tracing::info!("Admin user created! ID: {}, Email: {}", user.id, user.email);
        }
        AdminOutcome::Exists(user) => {
            if user.is_admin() {
                tracing::info!("Admin already exists: {}", user.email);
            } else {
                tracing::warn!(
                    "A customer account already uses {}; not promoting it",
                    user.email
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use grocery_mart_server::store::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let stores = Stores::memory(Arc::new(MemoryStore::new()));
        let users = stores.users.as_ref();

        let first = ensure_admin(users, "admin@grocerymart.com", "Admin User")
            .await
            .unwrap();
        let AdminOutcome::Created(created) = first else {
            panic!("expected a new admin");
        };
        assert_eq!(created.role, Role::Admin);

        let second = ensure_admin(users, "admin@grocerymart.com", "Someone Else")
            .await
            .unwrap();
        let AdminOutcome::Exists(existing) = second else {
            panic!("expected the existing admin");
        };
        assert_eq!(existing.id, created.id);
        assert_eq!(existing.name, "Admin User");
    }

    #[tokio::test]
    async fn test_ensure_admin_rejects_bad_input() {
        let stores = Stores::memory(Arc::new(MemoryStore::new()));

        let result = ensure_admin(stores.users.as_ref(), "not-an-email", "Admin").await;
        assert!(matches!(result, Err(CommandError::Invalid(_))));

        let result = ensure_admin(stores.users.as_ref(), "a@b.com", "  ").await;
        assert!(matches!(result, Err(CommandError::Invalid(_))));
    }
}
