//! Payment API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentCustomer;
use crate::core::ServerState;
use crate::db::models::PaymentRow;
use crate::db::repository::PaymentRepository;
use crate::payment::gateway::{PixIntentResponse, PixRequest};
use crate::utils::{AppError, AppResult};

/// Generate a PIX charge + QR for an order the customer owns
pub async fn generate_pix(
    State(state): State<ServerState>,
    customer: CurrentCustomer,
    Json(payload): Json<PixRequest>,
) -> AppResult<Json<PixIntentResponse>> {
    let response = state.payments.generate_pix_intent(customer.0, &payload).await?;
    Ok(Json(response))
}

/// Fetch one payment; the storefront polls this as the realtime fallback
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<PaymentRow>> {
    let repo = PaymentRepository::new(state.pool.clone());
    let payment = repo
        .find_by_id(&id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Payment {id} not found")))?;
    Ok(Json(payment))
}
