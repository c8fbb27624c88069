//! Order API Module

mod handler;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/", get(handler::list_all))
        .route("/mine", get(handler::list_mine))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}", delete(handler::remove))
        .route("/{id}/status", patch(handler::update_status))
        .route(
            "/{id}/delivery-token/validate",
            post(handler::validate_delivery_token),
        )
}
