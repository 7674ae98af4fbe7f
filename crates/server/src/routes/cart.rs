//! Cart routes. All require an authenticated user.

use axum::{Json as JsonResponse, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use grocery_mart_core::ProductId;

use super::extract::{Json, quantity};
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::CartService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// `GET /api/cart`
pub async fn show(
    RequireUser(principal): RequireUser,
    State(state): State<AppState>,
) -> Result<JsonResponse<Value>> {
    let cart = CartService::new(state.stores())
        .get_cart(principal.user_id)
        .await?;
    Ok(JsonResponse(json!({ "cart": cart })))
}

/// `POST /api/cart/add`
pub async fn add(
    RequireUser(principal): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<JsonResponse<Value>> {
    let quantity = quantity(body.quantity.unwrap_or(1))?;
    let cart = CartService::new(state.stores())
        .add_item(principal.user_id, body.product_id, quantity)
        .await?;
    Ok(JsonResponse(
        json!({ "message": "Item added to cart", "cart": cart }),
    ))
}

/// `POST /api/cart/remove`
pub async fn remove(
    RequireUser(principal): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<RemoveFromCartRequest>,
) -> Result<JsonResponse<Value>> {
    let cart = CartService::new(state.stores())
        .remove_item(principal.user_id, body.product_id)
        .await?;
    Ok(JsonResponse(
        json!({ "message": "Item removed from cart", "cart": cart }),
    ))
}

/// `PUT /api/cart/update`
pub async fn update(
    RequireUser(principal): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateCartRequest>,
) -> Result<JsonResponse<Value>> {
    let quantity = quantity(body.quantity)?;
    let cart = CartService::new(state.stores())
        .set_quantity(principal.user_id, body.product_id, quantity)
        .await?;
    Ok(JsonResponse(json!({ "message": "Cart updated", "cart": cart })))
}
