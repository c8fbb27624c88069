//! Realtime notification gateway
//!
//! # Architecture
//!
//! ```text
//! OrderStore / WebhookReconciler ──▶ emit() ──▶ broadcast::Sender<Envelope>
//!                                                      │
//!                                        ┌─────────────┼─────────────┐
//!                                        ▼             ▼             ▼
//!                                   ws session    ws session    ws session
//!                                  (customer 4)  (customer 9)    (admin)
//! ```
//!
//! Each WebSocket session subscribes to the channel and filters envelopes by
//! the identity it registered. Delivery is fire-and-forget: with no
//! subscriber the send result is dropped, and clients reconcile missed
//! events through the order/payment polling endpoints.

use serde::Serialize;
use serde_json::json;
use tokio::sync::broadcast;

use crate::db::models::OrderDetail;

/// Who an envelope is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// One customer, by application-level id
    Customer(i64),
    /// Every registered back-office subscriber
    Admins,
}

/// One realtime event in flight
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    #[serde(skip)]
    pub audience: Audience,
    pub event: &'static str,
    pub data: serde_json::Value,
}

/// Identity a WebSocket session registered after connecting
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIdentity {
    pub customer_id: Option<i64>,
    pub is_admin: bool,
}

impl Envelope {
    /// Whether this envelope should be delivered to the given session
    pub fn matches(&self, identity: &ClientIdentity) -> bool {
        match self.audience {
            Audience::Customer(id) => identity.customer_id == Some(id),
            Audience::Admins => identity.is_admin,
        }
    }
}

/// Publish/subscribe hub for order and payment events
#[derive(Debug, Clone)]
pub struct NotificationGateway {
    tx: broadcast::Sender<Envelope>,
}

impl NotificationGateway {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe a session. Only envelopes sent after this call arrive.
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }

    /// Best-effort emit. A send error only means nobody is connected.
    pub fn emit(&self, audience: Audience, event: &'static str, data: serde_json::Value) {
        let _ = self.tx.send(Envelope {
            audience,
            event,
            data,
        });
    }

    /// Tell the customer their PIX payment cleared
    pub fn notify_payment_approved(&self, order: &OrderDetail) {
        self.emit(
            Audience::Customer(order.order.customer_id),
            "paymentApproved",
            json!({
                "order_id": order.order.id,
                "order_number": order.order.order_number,
                "status": order.order.status,
                "total": order.order.total,
            }),
        );
    }

    /// Tell the back-office a paid order is ready to prepare
    pub fn notify_new_order_to_admin(&self, order: &OrderDetail) {
        self.emit(
            Audience::Admins,
            "newOrderForAdmin",
            json!({
                "order_id": order.order.id,
                "order_number": order.order.order_number,
                "customer": order.customer.name,
                "total": order.order.total,
            }),
        );
    }

    /// Broadcast a kitchen/delivery status change to the order's customer.
    /// No-op for statuses without a realtime event (pending, confirmed).
    pub fn notify_status_change(&self, order: &OrderDetail) {
        let Some(event) = order.order.status.realtime_event() else {
            return;
        };
        self.emit(
            Audience::Customer(order.order.customer_id),
            event,
            json!({
                "order_id": order.order.id,
                "order_number": order.order.order_number,
                "status": order.order.status,
                "estimated_time": order.order.estimated_time,
            }),
        );
    }
}

impl Default for NotificationGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelopes_are_filtered_by_audience() {
        let customer = Envelope {
            audience: Audience::Customer(4),
            event: "paymentApproved",
            data: json!({}),
        };
        let admin = Envelope {
            audience: Audience::Admins,
            event: "newOrderForAdmin",
            data: json!({}),
        };

        let session_four = ClientIdentity {
            customer_id: Some(4),
            is_admin: false,
        };
        let session_nine = ClientIdentity {
            customer_id: Some(9),
            is_admin: false,
        };
        let session_admin = ClientIdentity {
            customer_id: None,
            is_admin: true,
        };
        let unregistered = ClientIdentity::default();

        assert!(customer.matches(&session_four));
        assert!(!customer.matches(&session_nine));
        assert!(!customer.matches(&session_admin));
        assert!(!customer.matches(&unregistered));

        assert!(admin.matches(&session_admin));
        assert!(!admin.matches(&session_four));
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_a_silent_drop() {
        let gateway = NotificationGateway::new();
        // Must not panic or error
        gateway.emit(Audience::Admins, "newOrderForAdmin", json!({"order_id": 1}));
    }

    #[tokio::test]
    async fn subscribers_receive_events_emitted_after_subscribing() {
        let gateway = NotificationGateway::new();
        gateway.emit(Audience::Customer(1), "paymentApproved", json!({"early": true}));

        let mut rx = gateway.subscribe();
        gateway.emit(Audience::Customer(1), "paymentApproved", json!({"late": true}));

        let envelope = rx.try_recv().unwrap();
        assert_eq!(envelope.event, "paymentApproved");
        assert_eq!(envelope.data["late"], true);
        // The pre-subscription event was dropped
        assert!(rx.try_recv().is_err());
    }
}
