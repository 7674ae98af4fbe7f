//! Product repository.
//!
//! Stock is only ever lowered by [`ProductRepository::try_decrement_stock`],
//! a single conditional `UPDATE` that Postgres applies atomically per row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use grocery_mart_core::{Category, Price, ProductId};

use super::{RepositoryError, to_count, to_i32, to_u32};
use crate::models::{NewProduct, Product, ProductFilter, ProductPatch};
use crate::store::ProductStore;

const PRODUCT_COLUMNS: &str =
    "id, name, description, category, price, stock, image, unit, rating, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    category: String,
    price: Decimal,
    stock: i32,
    image: String,
    unit: String,
    rating: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category: Category = row.category.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category in database: {e}"))
        })?;
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            category,
            price,
            stock: to_u32(row.stock, "stock")?,
            image: row.image,
            unit: row.unit,
            rating: row.rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
    rows.into_iter().map(Product::try_from).collect()
}

/// Build an `ILIKE` pattern that matches `term` literally anywhere.
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL`-backed catalog.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM grocery.product
             WHERE ($1::text IS NULL OR category = $1)
               AND ($2::text IS NULL OR name ILIKE $2 OR description ILIKE $2)
             ORDER BY name, id
             LIMIT $3"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(filter.category.map(|c| c.as_str()))
            .bind(filter.search_term().map(|t| contains_pattern(&t)))
            .bind(i64::try_from(filter.effective_limit()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        into_products(rows)
    }

    async fn list_newest(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM grocery.product ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        into_products(rows)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM grocery.product WHERE id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM grocery.product WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&raw)
            .fetch_all(&self.pool)
            .await?;

        into_products(rows)
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let sql = format!(
            "INSERT INTO grocery.product
                 (name, description, category, price, stock, image, unit, rating)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.category.as_str())
            .bind(product.price.amount())
            .bind(to_i32(product.stock, "stock")?)
            .bind(&product.image)
            .bind(&product.unit)
            .bind(product.rating)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn update(
        &self,
        id: ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, RepositoryError> {
        let stock = patch.stock.map(|s| to_i32(s, "stock")).transpose()?;
        let sql = format!(
            "UPDATE grocery.product SET
                 name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 category = COALESCE($4, category),
                 price = COALESCE($5, price),
                 stock = COALESCE($6, stock),
                 image = COALESCE($7, image),
                 unit = COALESCE($8, unit),
                 rating = COALESCE($9, rating),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.description.as_deref())
            .bind(patch.category.map(|c| c.as_str()))
            .bind(patch.price.map(|p| p.amount()))
            .bind(stock)
            .bind(patch.image.as_deref())
            .bind(patch.unit.as_deref())
            .bind(patch.rating)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Product::try_from).transpose()
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM grocery.product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM grocery.product")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn try_decrement_stock(
        &self,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE grocery.product
             SET stock = stock - $2, updated_at = NOW()
             WHERE id = $1 AND stock >= $2",
        )
        .bind(id)
        .bind(to_i32(quantity, "quantity")?)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn increment_stock(&self, id: ProductId, quantity: u32) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE grocery.product
             SET stock = stock + $2, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(to_i32(quantity, "quantity")?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM grocery.product")
            .fetch_one(&self.pool)
            .await?;

        Ok(to_count(count))
    }

    async fn count_low_stock(&self, threshold: u32) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM grocery.product WHERE stock < $1")
            .bind(to_i32(threshold, "threshold")?)
            .fetch_one(&self.pool)
            .await?;

        Ok(to_count(count))
    }
}
