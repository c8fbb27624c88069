//! Payment provider webhook handler
//!
//! Everything interesting happens in the reconciler; this handler only
//! collects the signature headers, the query fallback id and the raw body.
//! The response is always HTTP 200 so the provider never retries pointlessly.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};

use crate::core::ServerState;
use crate::payment::{WebhookDelivery, WebhookResponse};

pub async fn mercadopago(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> Json<WebhookResponse> {
    let delivery = WebhookDelivery {
        signature: header_value(&headers, "x-signature"),
        request_id: header_value(&headers, "x-request-id"),
        data_id_query: params.get("data.id").cloned(),
        raw_body: body,
    };
    Json(state.reconciler.handle(delivery).await)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
