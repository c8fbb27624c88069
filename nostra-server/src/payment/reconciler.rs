//! Webhook Reconciler
//!
//! Provider callbacks are duplicated, reordered and occasionally malformed;
//! this pipeline absorbs all of that:
//!
//! 1. Signature validation is advisory: log and continue on failure.
//! 2. Non-payment events acknowledge as no-ops.
//! 3. The payment id comes from the body, query param as fallback.
//! 4. Provider statuses map through one fixed total table.
//! 5. An unknown payment id is a soft success (test traffic exists).
//! 6. The *only* trigger for confirmation side effects is winning the
//!    conditional `(not approved) → approved` write; redeliveries and
//!    concurrent deliveries lose that write and become no-ops.
//! 7. Every side effect after the payment write is individually
//!    fault-isolated; a dead mail server never fails the webhook.
//!
//! The response is always structured and always HTTP 200; provider retry
//! storms help nobody once the payment row itself is settled.

use serde::Serialize;
use serde_json::Value;

use super::signature;
use crate::db::models::PaymentStatus;
use crate::db::repository::PaymentRepository;
use crate::notify::{EmailService, NotificationGateway};
use crate::orders::OrderStore;
use crate::receipt::ReceiptService;
use crate::utils::time::now_millis;
use crate::utils::AppResult;

/// Structured webhook result, serialized as the HTTP 200 body
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
}

impl WebhookResponse {
    fn soft_ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
            error: None,
            payment_status: None,
            order_id: None,
            order_number: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: None,
            error: Some(error.into()),
            payment_status: None,
            order_id: None,
            order_number: None,
        }
    }

    fn processed(
        payment_status: PaymentStatus,
        order_id: Option<i64>,
        order_number: Option<String>,
    ) -> Self {
        Self {
            ok: true,
            message: Some("Webhook processed".to_string()),
            error: None,
            payment_status: Some(payment_status),
            order_id,
            order_number,
        }
    }
}

/// Incoming webhook material, extracted by the HTTP handler
#[derive(Debug, Default)]
pub struct WebhookDelivery {
    pub signature: Option<String>,
    pub request_id: Option<String>,
    pub data_id_query: Option<String>,
    pub raw_body: String,
}

#[derive(Clone)]
pub struct WebhookReconciler {
    payments: PaymentRepository,
    orders: OrderStore,
    receipts: ReceiptService,
    email: EmailService,
    notifier: NotificationGateway,
    webhook_secret: Option<String>,
}

impl WebhookReconciler {
    pub fn new(
        payments: PaymentRepository,
        orders: OrderStore,
        receipts: ReceiptService,
        email: EmailService,
        notifier: NotificationGateway,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            payments,
            orders,
            receipts,
            email,
            notifier,
            webhook_secret,
        }
    }

    /// Process one delivery. Never returns an error to the HTTP layer: the
    /// top-level guard converts internal failures into `{ok: false, error}`.
    pub async fn handle(&self, delivery: WebhookDelivery) -> WebhookResponse {
        match self.process(&delivery).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "webhook processing failed");
                WebhookResponse::failed(e.to_string())
            }
        }
    }

    async fn process(&self, delivery: &WebhookDelivery) -> AppResult<WebhookResponse> {
        let body: Value = match serde_json::from_str(&delivery.raw_body) {
            Ok(value) => value,
            Err(e) => return Ok(WebhookResponse::failed(format!("Invalid JSON payload: {e}"))),
        };

        // Event filtering: only payment events matter
        let event_type = body.get("type").and_then(Value::as_str);
        if event_type != Some("payment") {
            tracing::debug!(event_type, "ignoring non-payment webhook event");
            return Ok(WebhookResponse::soft_ok("Event ignored (type is not payment)"));
        }

        // Payment id: structured body first, query param as fallback
        let payment_id = body
            .pointer("/data/id")
            .map(id_value_to_string)
            .filter(|id| !id.is_empty())
            .or_else(|| {
                delivery
                    .data_id_query
                    .as_ref()
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
            });
        let Some(payment_id) = payment_id else {
            tracing::warn!("webhook carried no payment id");
            return Ok(WebhookResponse::failed("Payment id not found in webhook"));
        };

        tracing::info!(payment_id = %payment_id, "processing payment webhook");

        // Advisory signature check: a forged or missing signature is logged,
        // never rejected; the payment lookup is the real gate.
        if let (Some(sig), Some(request_id), Some(secret)) = (
            &delivery.signature,
            &delivery.request_id,
            &self.webhook_secret,
        ) {
            match signature::verify(secret, sig, &payment_id, request_id) {
                Ok(()) => tracing::debug!("webhook signature valid"),
                Err(e) => {
                    tracing::warn!(error = %e, "webhook signature validation failed (continuing)")
                }
            }
        }

        // Provider pings without a status mean the charge settled
        let provider_status = body
            .pointer("/data/status")
            .and_then(Value::as_str)
            .unwrap_or("approved");
        let mapped = PaymentStatus::from_provider(provider_status);

        let Some(payment) = self.payments.find_for_webhook(&payment_id).await? else {
            tracing::warn!(payment_id = %payment_id, "payment not found for webhook");
            return Ok(WebhookResponse::soft_ok(format!(
                "Payment {payment_id} not found"
            )));
        };

        let now = now_millis();
        let newly_approved = if mapped == PaymentStatus::Approved {
            // Sole gate for all confirmation side effects: only the caller
            // that flips the row off a non-approved status gets it back.
            self.payments.approve_if_pending(&payment.id, now).await?
        } else {
            self.payments
                .set_status_if_not_approved(&payment.id, mapped, now)
                .await?;
            None
        };

        let current_status = if payment.status == PaymentStatus::Approved {
            // Monotonic: an approved payment is never regressed
            PaymentStatus::Approved
        } else {
            mapped
        };

        let Some(approved) = newly_approved else {
            tracing::info!(
                payment_id = %payment.id,
                previous = %payment.status,
                status = %current_status,
                "payment updated without confirmation edge"
            );
            return Ok(WebhookResponse::processed(
                current_status,
                payment.order_id,
                None,
            ));
        };

        tracing::info!(payment_id = %approved.id, "payment approved, confirming order");
        self.run_confirmation_effects(&approved).await
    }

    /// Fan out the confirmation side effects for a payment that just won the
    /// approval edge. Each step is isolated: failures log and continue.
    async fn run_confirmation_effects(
        &self,
        payment: &crate::db::models::PaymentRow,
    ) -> AppResult<WebhookResponse> {
        let Some(order_id) = payment.order_id else {
            tracing::warn!(payment_id = %payment.id, "approved payment has no linked order");
            return Ok(WebhookResponse::soft_ok(
                "Payment approved but no order is linked to it",
            ));
        };

        let order = match self.orders.get_order(order_id).await {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(order_id, error = %e, "order not found for approved payment");
                let mut response =
                    WebhookResponse::soft_ok("Payment approved but its order was not found");
                response.payment_status = Some(PaymentStatus::Approved);
                return Ok(response);
            }
        };

        // Transition + audit row ("approved via webhook")
        let order = best_effort("confirm_order", self.orders.confirm_paid(order_id))
            .await
            .unwrap_or(order);

        // Receipt with auto-mail; a mail-capable generator that fails falls
        // back to plain generation (the row itself is idempotent).
        if best_effort("receipt_with_email", self.receipts.generate(order_id, true))
            .await
            .is_none()
        {
            best_effort("receipt_plain", self.receipts.generate(order_id, false)).await;
        }

        // Confirmation e-mail directly to the customer, when one is on file
        if let Some(address) = order.customer.email.clone() {
            best_effort(
                "customer_email",
                self.email.send_order_confirmation(
                    &address,
                    &order.order.order_number,
                    order.order.total,
                ),
            )
            .await;
        } else {
            tracing::debug!(order_id, "customer has no e-mail on file, skipping confirmation mail");
        }

        // Back-office alert
        best_effort(
            "admin_email",
            self.email.notify_new_order(
                &order.order.order_number,
                &order.customer.name,
                order.order.total,
            ),
        )
        .await;

        // Realtime fan-out (fire and forget by construction)
        self.notifier.notify_payment_approved(&order);
        self.notifier.notify_new_order_to_admin(&order);

        tracing::info!(
            order_id,
            order_number = %order.order.order_number,
            "order confirmed and ready for the kitchen"
        );

        Ok(WebhookResponse::processed(
            PaymentStatus::Approved,
            Some(order.order.id),
            Some(order.order.order_number.clone()),
        ))
    }
}

/// Run one side effect, swallowing and logging its error. Keeps the
/// "a notification failure never breaks confirmation" contract in one
/// visible place.
async fn best_effort<T>(
    step: &'static str,
    operation: impl Future<Output = AppResult<T>>,
) -> Option<T> {
    match operation.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(step, error = %e, "webhook side effect failed, continuing");
            None
        }
    }
}

/// Provider ids arrive as strings or numbers depending on the event shape
fn id_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
