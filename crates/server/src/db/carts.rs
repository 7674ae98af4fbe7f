//! Cart repository. One row per user; lines are a JSONB array.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use grocery_mart_core::UserId;

use super::RepositoryError;
use crate::models::{Cart, CartLine};
use crate::store::CartStore;

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    user_id: i32,
    lines: Json<Vec<CartLine>>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            lines: row.lines.0,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL`-backed carts.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for CartRepository {
    async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query_as::<_, CartRow>(
            "INSERT INTO grocery.cart (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING user_id, lines, updated_at",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn save(&self, cart: &Cart) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO grocery.cart (user_id, lines, updated_at) VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO UPDATE
             SET lines = EXCLUDED.lines, updated_at = EXCLUDED.updated_at",
        )
        .bind(cart.user_id)
        .bind(Json(&cart.lines))
        .bind(cart.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
