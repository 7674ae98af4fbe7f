//! Admin routes. Every handler requires the admin role.

use axum::{Json as JsonResponse, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use grocery_mart_core::{Category, OrderId, OrderStatus, Price, ProductId};

use super::extract::{Json, Path, Query};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::product::{DEFAULT_IMAGE, DEFAULT_UNIT};
use crate::models::{NewProduct, ProductPatch};
use crate::services::{AdminService, ServiceError};
use crate::state::AppState;

// =============================================================================
// Request bodies
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductRequest {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub price: Decimal,
    pub stock: i64,
    pub image: Option<String>,
    pub unit: Option<String>,
    pub rating: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub image: Option<String>,
    pub unit: Option<String>,
    pub rating: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
}

fn price(value: Decimal) -> std::result::Result<Price, ServiceError> {
    Price::new(value).map_err(|e| ServiceError::Validation(e.to_string()))
}

fn stock(value: i64) -> std::result::Result<u32, ServiceError> {
    u32::try_from(value)
        .map_err(|_| ServiceError::Validation("stock must be a non-negative integer".to_string()))
}

/// Blank optional strings fall back to the default.
fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl TryFrom<AddProductRequest> for NewProduct {
    type Error = ServiceError;

    fn try_from(body: AddProductRequest) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            name: body.name.trim().to_string(),
            description: body.description.trim().to_string(),
            category: body.category,
            price: price(body.price)?,
            stock: stock(body.stock)?,
            image: or_default(body.image, DEFAULT_IMAGE),
            unit: or_default(body.unit, DEFAULT_UNIT),
            rating: body.rating.unwrap_or_default(),
        })
    }
}

impl TryFrom<UpdateProductRequest> for ProductPatch {
    type Error = ServiceError;

    fn try_from(body: UpdateProductRequest) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            name: body.name.map(|n| n.trim().to_string()),
            description: body.description.map(|d| d.trim().to_string()),
            category: body.category,
            price: body.price.map(price).transpose()?,
            stock: body.stock.map(stock).transpose()?,
            image: body.image,
            unit: body.unit,
            rating: body.rating,
        })
    }
}

impl OrdersQuery {
    fn status(&self) -> std::result::Result<Option<OrderStatus>, ServiceError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("" | "All" | "all") => Ok(None),
            Some(raw) => raw
                .parse::<OrderStatus>()
                .map(Some)
                .map_err(|e| ServiceError::Validation(e.to_string())),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/admin/dashboard`
pub async fn dashboard(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<JsonResponse<Value>> {
    let stats = AdminService::new(state.stores())
        .dashboard(state.config().low_stock_threshold)
        .await?;
    Ok(JsonResponse(json!({ "stats": stats })))
}

/// `POST /api/admin/products/add`
pub async fn add_product(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<AddProductRequest>,
) -> Result<(StatusCode, JsonResponse<Value>)> {
    let new_product = NewProduct::try_from(body)?;
    let product = AdminService::new(state.stores())
        .add_product(new_product)
        .await?;
    Ok((
        StatusCode::CREATED,
        JsonResponse(json!({ "message": "Product added successfully", "product": product })),
    ))
}

/// `PUT /api/admin/products/update/{id}`
pub async fn update_product(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<JsonResponse<Value>> {
    let patch = ProductPatch::try_from(body)?;
    let product = AdminService::new(state.stores())
        .update_product(id, patch)
        .await?;
    Ok(JsonResponse(
        json!({ "message": "Product updated successfully", "product": product }),
    ))
}

/// `DELETE /api/admin/products/delete/{id}`
pub async fn delete_product(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<JsonResponse<Value>> {
    AdminService::new(state.stores()).delete_product(id).await?;
    Ok(JsonResponse(
        json!({ "message": "Product deleted successfully" }),
    ))
}

/// `GET /api/admin/products`
pub async fn products(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<JsonResponse<Value>> {
    let products = AdminService::new(state.stores()).list_products().await?;
    Ok(JsonResponse(json!({ "products": products })))
}

/// `GET /api/admin/users`
pub async fn users(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
) -> Result<JsonResponse<Value>> {
    let users = AdminService::new(state.stores()).list_customers().await?;
    Ok(JsonResponse(json!({ "users": users })))
}

/// `GET /api/admin/orders?status=`
pub async fn orders(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<JsonResponse<Value>> {
    let status = query.status()?;
    let orders = AdminService::new(state.stores())
        .list_orders(status)
        .await?;
    Ok(JsonResponse(json!({ "orders": orders })))
}

/// `PUT /api/admin/orders/{id}/status`
pub async fn update_order_status(
    RequireAdmin(_): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<JsonResponse<Value>> {
    let order = AdminService::new(state.stores())
        .update_order_status(id, body.status)
        .await?;
    Ok(JsonResponse(
        json!({ "message": "Order status updated", "order": order }),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn body() -> AddProductRequest {
        AddProductRequest {
            name: " Toor Dal ".to_string(),
            description: "Split pigeon peas".to_string(),
            category: Category::Staples,
            price: Decimal::new(14900, 2),
            stock: 30,
            image: Some("  ".to_string()),
            unit: None,
            rating: None,
        }
    }

    #[test]
    fn test_add_request_defaults() {
        let product = NewProduct::try_from(body()).unwrap();
        assert_eq!(product.name, "Toor Dal");
        assert_eq!(product.image, DEFAULT_IMAGE);
        assert_eq!(product.unit, DEFAULT_UNIT);
        assert_eq!(product.rating, Decimal::ZERO);
    }

    #[test]
    fn test_add_request_rejects_negatives() {
        let negative_price = AddProductRequest {
            price: Decimal::NEGATIVE_ONE,
            ..body()
        };
        assert!(NewProduct::try_from(negative_price).is_err());

        let negative_stock = AddProductRequest { stock: -1, ..body() };
        assert!(NewProduct::try_from(negative_stock).is_err());
    }

    #[test]
    fn test_add_request_rejects_unstorable_prices() {
        let huge = AddProductRequest {
            price: Decimal::MAX,
            ..body()
        };
        assert!(matches!(
            NewProduct::try_from(huge),
            Err(ServiceError::Validation(_))
        ));

        let fractional_paise = AddProductRequest {
            price: Decimal::new(149_005, 3),
            ..body()
        };
        assert!(NewProduct::try_from(fractional_paise).is_err());

        let patch = UpdateProductRequest {
            price: Some(Decimal::MAX),
            ..UpdateProductRequest::default()
        };
        assert!(ProductPatch::try_from(patch).is_err());
    }

    #[test]
    fn test_orders_query_status() {
        let query = |s: &str| OrdersQuery {
            status: Some(s.to_string()),
        };
        assert_eq!(query("All").status().unwrap(), None);
        assert_eq!(
            query("Out for Delivery").status().unwrap(),
            Some(OrderStatus::OutForDelivery)
        );
        assert!(query("Shipped").status().is_err());
        assert_eq!(OrdersQuery::default().status().unwrap(), None);
    }
}
