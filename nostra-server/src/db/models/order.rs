//! Order models
//!
//! Status lives in a closed enum with an explicit transition table; the
//! history trail and the per-status timestamps are driven from it.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::customer::{AddressRow, CustomerSummary};

/// Order lifecycle status
///
/// Allowed transitions:
///
/// ```text
/// pending → confirmed → preparing → on_delivery → delivered
///     └────────┴────────────┴────────────┴──→ cancelled
/// ```
///
/// `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    OnDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether `next` is a legal successor of `self`
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Pending, Confirmed) => true,
            (Confirmed, Preparing) => true,
            (Preparing, OnDelivery) => true,
            (OnDelivery, Delivered) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Timestamp column stamped on first entry into this status
    pub fn stamp_column(self) -> Option<&'static str> {
        match self {
            OrderStatus::Confirmed => Some("confirmed_at"),
            OrderStatus::Preparing => Some("started_preparing_at"),
            OrderStatus::OnDelivery => Some("out_for_delivery_at"),
            OrderStatus::Delivered => Some("delivered_at"),
            _ => None,
        }
    }

    /// Realtime event name broadcast when an order enters this status
    pub fn realtime_event(self) -> Option<&'static str> {
        match self {
            OrderStatus::Preparing => Some("orderPreparing"),
            OrderStatus::OnDelivery => Some("orderOnDelivery"),
            OrderStatus::Delivered => Some("orderDelivered"),
            OrderStatus::Cancelled => Some("orderCancelled"),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OnDelivery => "on_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method chosen at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentMethod {
    Pix,
    Cash,
    DebitCard,
    CreditCard,
}

/// One order row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub order_number: String,
    pub customer_id: i64,
    pub address_id: i64,
    pub status: OrderStatus,
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub discount: i64,
    pub total: i64,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub delivery_token: Option<String>,
    pub estimated_time: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub confirmed_at: Option<i64>,
    pub started_preparing_at: Option<i64>,
    pub out_for_delivery_at: Option<i64>,
    pub delivered_at: Option<i64>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<i64>,
}

/// One line item with catalog names resolved
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItemDetail {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub variant_id: i64,
    pub crust_id: Option<i64>,
    pub filling_id: Option<i64>,
    pub quantity: i64,
    pub unit_price: i64,
    pub crust_price: i64,
    pub filling_price: i64,
    pub line_total: i64,
    pub notes: Option<String>,
    pub product_name: String,
    pub variant_name: String,
    pub crust_name: Option<String>,
    pub filling_name: Option<String>,
}

/// Append-only status audit row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderStatusHistoryRow {
    pub id: i64,
    pub order_id: i64,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: i64,
}

/// Fully resolved order: row + items + address + customer
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderRow,
    pub items: Vec<OrderItemDetail>,
    pub address: AddressRow,
    pub customer: CustomerSummary,
}

// ========== Insert payloads ==========

/// Order insert payload, totals already resolved
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: i64,
    pub address_id: i64,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub subtotal: i64,
    pub delivery_fee: i64,
    pub discount: i64,
    pub total: i64,
    pub delivery_token: String,
    pub estimated_time: i64,
}

/// Priced line ready for insertion (output of the pricing resolver)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub variant_id: i64,
    pub crust_id: Option<i64>,
    pub filling_id: Option<i64>,
    pub quantity: i64,
    pub unit_price: i64,
    pub crust_price: i64,
    pub filling_price: i64,
    pub line_total: i64,
    pub notes: Option<String>,
}

// ========== Request DTOs ==========

/// Checkout payload for `POST /api/orders`
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub address_id: i64,
    #[validate(length(min = 1, message = "order must contain at least one item"), nested)]
    pub items: Vec<OrderItemRequest>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// One cart line in the checkout payload
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub variant_id: i64,
    pub crust_id: Option<i64>,
    pub filling_id: Option<i64>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i64,
    pub notes: Option<String>,
}

/// Status change payload for `PATCH /api/orders/{id}/status`
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}
