//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{Caller, CurrentCustomer, CurrentStaff};
use crate::core::ServerState;
use crate::db::models::{CreateOrderRequest, OrderDetail, OrderRow, UpdateOrderStatusRequest};
use crate::utils::{AppError, AppResult};

/// Create an order from the customer's cart
pub async fn create(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<OrderDetail>> {
    payload
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let order = state.orders.create_order(customer.0, payload).await?;
    Ok(Json(order))
}

/// Get one order; customers only see their own
pub async fn get_by_id(
    State(state): State<ServerState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let order = state.orders.get_order(id).await?;
    if !caller.is_staff() && caller.customer_id != Some(order.order.customer_id) {
        // Don't reveal that the order exists
        return Err(AppError::not_found(format!("Order #{id} not found")));
    }
    Ok(Json(order))
}

/// List the requesting customer's orders, newest first
pub async fn list_mine(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
) -> AppResult<Json<Vec<OrderRow>>> {
    let orders = state.orders.list_by_customer(customer.0).await?;
    Ok(Json(orders))
}

/// List all orders (back-office)
pub async fn list_all(
    State(state): State<ServerState>,
    _staff: CurrentStaff,
) -> AppResult<Json<Vec<OrderRow>>> {
    let orders = state.orders.list_all().await?;
    Ok(Json(orders))
}

/// Transition an order's status (back-office)
pub async fn update_status(
    State(state): State<ServerState>,
    staff: CurrentStaff,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<OrderDetail>> {
    let order = state
        .orders
        .transition_status(id, payload.status, payload.notes, Some(staff.0))
        .await?;
    Ok(Json(order))
}

/// Soft-delete an order (back-office)
pub async fn remove(
    State(state): State<ServerState>,
    _staff: CurrentStaff,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    state.orders.soft_delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Delivery token payload
#[derive(Debug, Deserialize)]
pub struct ValidateTokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateTokenResponse {
    pub valid: bool,
}

/// Courier hand-off: exact token match marks the order delivered
pub async fn validate_delivery_token(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ValidateTokenRequest>,
) -> AppResult<Json<ValidateTokenResponse>> {
    let valid = state
        .orders
        .validate_delivery_token(id, &payload.token)
        .await?;
    Ok(Json(ValidateTokenResponse { valid }))
}
