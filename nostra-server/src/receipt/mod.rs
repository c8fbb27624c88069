//! Receipt Service
//!
//! One receipt per order, generated when the order is confirmed. Generation
//! is idempotent (UNIQUE on order_id), so webhook redeliveries and manual
//! confirmations cannot duplicate it. The optional e-mail send only happens
//! on the call that actually created the receipt.

use sqlx::SqlitePool;

use crate::db::models::ReceiptRow;
use crate::db::repository::{OrderRepository, ReceiptRepository};
use crate::notify::EmailService;
use crate::utils::time::{compact_date, now_millis, today_local};
use crate::utils::{AppError, AppResult};

/// Receipt number derived from the order id, `REC-YYYYMMDD-NNNNNN`
fn receipt_number(order_id: i64) -> String {
    format!("REC-{}-{:06}", compact_date(today_local()), order_id)
}

#[derive(Clone)]
pub struct ReceiptService {
    orders: OrderRepository,
    receipts: ReceiptRepository,
    email: EmailService,
}

impl ReceiptService {
    pub fn new(pool: SqlitePool, email: EmailService) -> Self {
        Self {
            orders: OrderRepository::new(pool.clone()),
            receipts: ReceiptRepository::new(pool),
            email,
        }
    }

    /// Generate (or fetch) the receipt for an order.
    ///
    /// With `send_email`, a mail failure surfaces as an error *after* the
    /// receipt row is safely persisted; callers retry without e-mail and
    /// land on the existing row.
    pub async fn generate(&self, order_id: i64, send_email: bool) -> AppResult<ReceiptRow> {
        let detail = self
            .orders
            .find_detail(order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order #{order_id} not found")))?;

        let number = receipt_number(order_id);
        let (receipt, created) = self
            .receipts
            .insert_or_get(order_id, &number, detail.order.total, now_millis())
            .await?;

        if created {
            tracing::info!(
                order_id,
                receipt_number = %receipt.receipt_number,
                "receipt generated"
            );
        } else {
            tracing::debug!(order_id, "receipt already exists, skipping generation");
        }

        if send_email && created {
            match &detail.customer.email {
                Some(address) => {
                    let sent = self
                        .email
                        .send_receipt(
                            address,
                            &receipt.receipt_number,
                            &detail.order.order_number,
                            receipt.total,
                        )
                        .await?;
                    if sent {
                        self.receipts.mark_emailed(receipt.id).await?;
                    }
                }
                None => {
                    tracing::debug!(order_id, "customer has no e-mail, receipt not mailed");
                }
            }
        }

        Ok(receipt)
    }

    pub async fn find_by_order(&self, order_id: i64) -> AppResult<Option<ReceiptRow>> {
        Ok(self.receipts.find_by_order(order_id).await?)
    }
}
