//! Order Store
//!
//! Owns the order lifecycle: checkout, status transitions, delivery-token
//! validation, cancellation and soft deletion. Every mutation funnels
//! through here: handlers and the webhook reconciler never touch order
//! rows directly.

use std::sync::Arc;

use sqlx::SqlitePool;

use super::token::{self, TokenThrottle};
use crate::db::models::{CreateOrderRequest, NewOrder, OrderDetail, OrderRow, OrderStatus};
use crate::db::repository::{CustomerRepository, OrderRepository};
use crate::notify::NotificationGateway;
use crate::pricing::PricingResolver;
use crate::receipt::ReceiptService;
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct OrderStore {
    repo: OrderRepository,
    customers: CustomerRepository,
    pricing: PricingResolver,
    receipts: ReceiptService,
    notifier: NotificationGateway,
    throttle: Arc<TokenThrottle>,
    delivery_fee_cents: i64,
    estimated_time_min: i64,
}

impl OrderStore {
    pub fn new(
        pool: SqlitePool,
        pricing: PricingResolver,
        receipts: ReceiptService,
        notifier: NotificationGateway,
        delivery_fee_cents: i64,
        estimated_time_min: i64,
    ) -> Self {
        Self {
            repo: OrderRepository::new(pool.clone()),
            customers: CustomerRepository::new(pool),
            pricing,
            receipts,
            notifier,
            throttle: Arc::new(TokenThrottle::new()),
            delivery_fee_cents,
            estimated_time_min,
        }
    }

    /// Checkout: validate the address, price the cart, persist everything
    /// atomically and return the order with relations resolved.
    pub async fn create_order(
        &self,
        customer_id: i64,
        request: CreateOrderRequest,
    ) -> AppResult<OrderDetail> {
        let address = self
            .customers
            .find_address(request.address_id)
            .await?
            .ok_or_else(|| {
                AppError::validation(format!("Address #{} not found", request.address_id))
            })?;
        if address.customer_id != customer_id {
            return Err(AppError::validation(
                "Address does not belong to this customer",
            ));
        }

        let cart = self.pricing.resolve(&request.items).await?;

        let delivery_fee = self.delivery_fee_cents;
        let discount = 0;
        let total = cart.subtotal + delivery_fee - discount;

        let order = NewOrder {
            customer_id,
            address_id: request.address_id,
            payment_method: request.payment_method,
            notes: request.notes,
            subtotal: cart.subtotal,
            delivery_fee,
            discount,
            total,
            delivery_token: token::generate(),
            estimated_time: self.estimated_time_min,
        };

        let order_id = self.repo.create_order(&order, &cart.lines, now_millis()).await?;
        tracing::info!(order_id, customer_id, total, "order created");

        self.get_order(order_id).await
    }

    /// One order with items, address and customer, excluding tombstoned rows
    pub async fn get_order(&self, order_id: i64) -> AppResult<OrderDetail> {
        self.repo
            .find_detail(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order #{order_id} not found")))
    }

    pub async fn list_by_customer(&self, customer_id: i64) -> AppResult<Vec<OrderRow>> {
        Ok(self.repo.list_by_customer(customer_id).await?)
    }

    pub async fn list_all(&self) -> AppResult<Vec<OrderRow>> {
        Ok(self.repo.list_all().await?)
    }

    /// Shared transition path: validate against the state machine, write the
    /// status (stamping its timestamp once), append the audit row.
    async fn apply_transition(
        &self,
        order_id: i64,
        next: OrderStatus,
        notes: Option<String>,
        staff_id: Option<i64>,
    ) -> AppResult<OrderDetail> {
        let current = self
            .repo
            .find_row(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order #{order_id} not found")))?;

        if !current.status.can_transition_to(next) {
            return Err(AppError::business_rule(format!(
                "Cannot transition order #{order_id} from {} to {next}",
                current.status
            )));
        }

        let now = now_millis();
        self.repo.update_status(order_id, next, now).await?;

        let note = notes.unwrap_or_else(|| format!("Status changed to {next}"));
        self.repo
            .append_history(order_id, next, Some(&note), staff_id, now)
            .await?;

        tracing::info!(order_id, from = %current.status, to = %next, "order status changed");
        self.get_order(order_id).await
    }

    /// Staff/manual status transition.
    ///
    /// Entering `confirmed` triggers best-effort receipt generation; kitchen
    /// and delivery statuses fan out their realtime event. Neither side
    /// effect can fail the transition itself.
    pub async fn transition_status(
        &self,
        order_id: i64,
        next: OrderStatus,
        notes: Option<String>,
        staff_id: Option<i64>,
    ) -> AppResult<OrderDetail> {
        let detail = self.apply_transition(order_id, next, notes, staff_id).await?;

        if next == OrderStatus::Confirmed
            && let Err(e) = self.receipts.generate(order_id, false).await
        {
            tracing::warn!(order_id, error = %e, "receipt generation failed after confirmation");
        }

        self.notifier.notify_status_change(&detail);
        Ok(detail)
    }

    /// Webhook-driven confirmation. The reconciler owns the receipt and
    /// notification fan-out, so this only moves the state machine and logs
    /// the audit row.
    pub async fn confirm_paid(&self, order_id: i64) -> AppResult<OrderDetail> {
        self.apply_transition(
            order_id,
            OrderStatus::Confirmed,
            Some("Payment approved via webhook".to_string()),
            None,
        )
        .await
    }

    /// Courier hand-off: exact token match transitions the order to
    /// `delivered`; a mismatch changes nothing and returns false.
    pub async fn validate_delivery_token(&self, order_id: i64, token: &str) -> AppResult<bool> {
        if !self.throttle.allow(order_id) {
            return Err(AppError::business_rule(
                "Too many token attempts for this order, try again later",
            ));
        }

        let order = self
            .repo
            .find_row(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order #{order_id} not found")))?;

        // Exact match only, no trimming or normalization
        match &order.delivery_token {
            Some(stored) if stored == token => {}
            _ => return Ok(false),
        }

        // Re-scans of an already delivered order stay true without touching state
        if order.status == OrderStatus::Delivered {
            return Ok(true);
        }

        self.transition_status(
            order_id,
            OrderStatus::Delivered,
            Some("Delivery confirmed with token by the courier".to_string()),
            None,
        )
        .await?;

        Ok(true)
    }

    /// Cancel with an optional reason
    pub async fn cancel(&self, order_id: i64, reason: Option<String>) -> AppResult<OrderDetail> {
        let note = reason.unwrap_or_else(|| "Order cancelled by the customer".to_string());
        self.transition_status(order_id, OrderStatus::Cancelled, Some(note), None)
            .await
    }

    /// Tombstone an order (admin removal / erasure requests)
    pub async fn soft_delete(&self, order_id: i64) -> AppResult<()> {
        let removed = self.repo.soft_delete(order_id, now_millis()).await?;
        if !removed {
            return Err(AppError::not_found(format!("Order #{order_id} not found")));
        }
        tracing::info!(order_id, "order soft-deleted");
        Ok(())
    }

    /// Audit trail, oldest first
    pub async fn history(&self, order_id: i64) -> AppResult<Vec<crate::db::models::OrderStatusHistoryRow>> {
        Ok(self.repo.history_for(order_id).await?)
    }
}
