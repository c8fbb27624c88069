//! Database models
//!
//! Row structs (`sqlx::FromRow`) and the enums stored as TEXT columns.

pub mod catalog;
pub mod customer;
pub mod order;
pub mod payment;
pub mod receipt;

pub use catalog::{CrustRow, FillingRow, VariantRow};
pub use customer::{AddressRow, CustomerRow, CustomerSummary};
pub use order::{
    CreateOrderRequest, NewOrder, NewOrderItem, OrderDetail, OrderItemDetail, OrderItemRequest,
    OrderRow, OrderStatus, OrderStatusHistoryRow, PaymentMethod, UpdateOrderStatusRequest,
};
pub use payment::{PaymentRow, PaymentStatus};
pub use receipt::ReceiptRow;
