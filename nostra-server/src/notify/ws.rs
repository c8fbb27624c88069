//! WebSocket endpoint for the realtime channel
//!
//! Clients connect to `/ws/notifications` and immediately register who they
//! are:
//!
//! ```json
//! { "event": "registerUser", "data": { "userId": 4 } }
//! { "event": "registerAdmin" }
//! ```
//!
//! From then on the session receives the gateway events matching its
//! identity as `{ "event": ..., "data": ... }` frames.

use axum::{
    Router,
    extract::State,
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use super::gateway::{ClientIdentity, NotificationGateway};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws/notifications", get(ws_handler))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    let gateway = state.notifier.clone();
    ws.on_upgrade(move |socket| client_session(socket, gateway))
}

/// Message a client sends over the socket
#[derive(Debug, Deserialize)]
struct ClientMessage {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

async fn client_session(socket: WebSocket, gateway: NotificationGateway) {
    let (mut sink, mut stream) = socket.split();
    let mut events = gateway.subscribe();
    let mut identity = ClientIdentity::default();

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(registered) = handle_register(text.as_str()) {
                            identity = registered;
                            tracing::debug!(
                                customer_id = ?identity.customer_id,
                                is_admin = identity.is_admin,
                                "realtime client registered"
                            );
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "realtime client read error");
                        break;
                    }
                }
            }
            event = events.recv() => {
                match event {
                    Ok(envelope) => {
                        if !envelope.matches(&identity) {
                            continue;
                        }
                        let Ok(frame) = serde_json::to_string(&envelope) else {
                            continue;
                        };
                        if sink.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    // Slow consumer: skipped events are reconciled via polling
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "realtime client lagged behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
}

/// Parse a registration frame; anything else is ignored
fn handle_register(text: &str) -> Option<ClientIdentity> {
    let message: ClientMessage = serde_json::from_str(text).ok()?;
    match message.event.as_str() {
        "registerUser" => {
            let user_id = message.data.get("userId").and_then(|v| v.as_i64())?;
            Some(ClientIdentity {
                customer_id: Some(user_id),
                is_admin: false,
            })
        }
        "registerAdmin" => Some(ClientIdentity {
            customer_id: None,
            is_admin: true,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_user_frame_parses() {
        let identity =
            handle_register(r#"{"event":"registerUser","data":{"userId":42}}"#).unwrap();
        assert_eq!(identity.customer_id, Some(42));
        assert!(!identity.is_admin);
    }

    #[test]
    fn register_admin_frame_parses() {
        let identity = handle_register(r#"{"event":"registerAdmin"}"#).unwrap();
        assert!(identity.customer_id.is_none());
        assert!(identity.is_admin);
    }

    #[test]
    fn other_frames_are_ignored() {
        assert!(handle_register(r#"{"event":"ping"}"#).is_none());
        assert!(handle_register(r#"{"event":"registerUser","data":{}}"#).is_none());
        assert!(handle_register("not json").is_none());
    }
}
