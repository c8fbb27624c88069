//! Webhook API Module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Webhook router. No auth at this boundary; the reconciler treats the
/// payment-row lookup as the real gate.
pub fn router() -> Router<ServerState> {
    Router::new().route("/webhook/mercadopago", post(handler::mercadopago))
}
