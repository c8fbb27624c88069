//! Receipt model

use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReceiptRow {
    pub id: i64,
    pub order_id: i64,
    pub receipt_number: String,
    pub total: i64,
    pub emailed: bool,
    pub created_at: i64,
}
