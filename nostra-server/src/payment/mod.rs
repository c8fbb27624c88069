//! Payments
//!
//! - [`gateway`] - PIX charge creation and local payment persistence
//! - [`qr`] - QR image rendering with placeholder fallback
//! - [`reconciler`] - webhook pipeline driving order confirmation
//! - [`signature`] - advisory webhook signature validation

pub mod gateway;
pub mod qr;
pub mod reconciler;
pub mod signature;

pub use gateway::{PixRequest, PixService};
pub use reconciler::{WebhookDelivery, WebhookReconciler, WebhookResponse};
