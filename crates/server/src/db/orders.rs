//! Order repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use grocery_mart_core::{DeliveryAddress, OrderId, OrderStatus, PaymentMethod, UserId};

use super::{RepositoryError, to_count};
use crate::models::{NewOrder, Order, OrderLine};
use crate::store::OrderStore;

const ORDER_COLUMNS: &str = "id, user_id, lines, total_amount, delivery_address, payment_method, \
                             status, order_date, delivery_date, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    lines: Json<Vec<OrderLine>>,
    total_amount: Decimal,
    delivery_address: Json<DeliveryAddress>,
    payment_method: String,
    status: String,
    order_date: DateTime<Utc>,
    delivery_date: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let payment_method: PaymentMethod = row.payment_method.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment method in database: {e}"))
        })?;
        let status: OrderStatus = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            lines: row.lines.0,
            total_amount: row.total_amount,
            delivery_address: row.delivery_address.0,
            payment_method,
            status,
            order_date: row.order_date,
            delivery_date: row.delivery_date,
            updated_at: row.updated_at,
        })
    }
}

fn into_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
    rows.into_iter().map(Order::try_from).collect()
}

/// `PostgreSQL`-backed orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn next_id(&self) -> Result<OrderId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            "SELECT nextval(pg_get_serial_sequence('grocery.customer_order', 'id'))::INTEGER",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderId::new(id))
    }

    async fn insert(&self, id: OrderId, order: NewOrder) -> Result<Order, RepositoryError> {
        let sql = format!(
            "INSERT INTO grocery.customer_order
                 (id, user_id, lines, total_amount, delivery_address, payment_method, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(order.user_id())
            .bind(Json(order.lines()))
            .bind(order.total_amount())
            .bind(Json(order.delivery_address()))
            .bind(order.payment_method().as_str())
            .bind(OrderStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn discard(&self, id: OrderId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM grocery.customer_order WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM grocery.customer_order WHERE id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM grocery.customer_order
             WHERE user_id = $1
             ORDER BY order_date DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        into_orders(rows)
    }

    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM grocery.customer_order
             WHERE ($1::text IS NULL OR status = $1)
             ORDER BY order_date DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?;

        into_orders(rows)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        delivered_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            "UPDATE grocery.customer_order
             SET status = $2,
                 delivery_date = COALESCE($3, delivery_date),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .bind(status.as_str())
            .bind(delivered_at)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    async fn count_by_status(&self, status: OrderStatus) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM grocery.customer_order WHERE status = $1")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(to_count(count))
    }

    async fn count_by_status_since(
        &self,
        status: OrderStatus,
        since: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM grocery.customer_order WHERE status = $1 AND order_date >= $2",
        )
        .bind(status.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(to_count(count))
    }
}
