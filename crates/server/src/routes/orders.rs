//! Order routes. All require an authenticated user.

use axum::{Json as JsonResponse, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use grocery_mart_core::{DeliveryAddress, OrderId, PaymentMethod};

use super::extract::{Json, Path};
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::{CheckoutService, OrderService, PlaceOrder};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub delivery_address: Option<DeliveryAddress>,
    pub payment_method: Option<PaymentMethod>,
}

impl From<CreateOrderRequest> for PlaceOrder {
    fn from(request: CreateOrderRequest) -> Self {
        Self {
            delivery_address: request.delivery_address,
            payment_method: request.payment_method.unwrap_or_default(),
        }
    }
}

/// `POST /api/order/create`
pub async fn create(
    RequireUser(principal): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, JsonResponse<Value>)> {
    let checkout = CheckoutService::new(state.stores(), state.config().store_timeout);
    let order = checkout
        .place_order(principal.user_id, body.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        JsonResponse(json!({ "message": "Order created successfully", "order": order })),
    ))
}

/// `GET /api/order/history`
pub async fn history(
    RequireUser(principal): RequireUser,
    State(state): State<AppState>,
) -> Result<JsonResponse<Value>> {
    let orders = OrderService::new(state.stores())
        .history(principal.user_id)
        .await?;
    Ok(JsonResponse(json!({ "orders": orders })))
}

/// `GET /api/order/{id}`
pub async fn show(
    RequireUser(principal): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<JsonResponse<Value>> {
    let order = OrderService::new(state.stores())
        .get(principal.user_id, id)
        .await?;
    Ok(JsonResponse(json!({ "order": order })))
}
