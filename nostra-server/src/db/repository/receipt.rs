//! Receipt Repository
//!
//! The UNIQUE index on order_id makes insertion idempotent: redelivered
//! approval webhooks land on the existing row.

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use crate::db::models::ReceiptRow;

#[derive(Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the receipt unless one already exists for the order.
    ///
    /// Returns the receipt row plus whether this call created it.
    pub async fn insert_or_get(
        &self,
        order_id: i64,
        receipt_number: &str,
        total: i64,
        now: i64,
    ) -> RepoResult<(ReceiptRow, bool)> {
        let result = sqlx::query(
            r#"
            INSERT INTO receipts (order_id, receipt_number, total, emailed, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            ON CONFLICT (order_id) DO NOTHING
            "#,
        )
        .bind(order_id)
        .bind(receipt_number)
        .bind(total)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let created = result.rows_affected() > 0;

        let row = sqlx::query_as::<_, ReceiptRow>("SELECT * FROM receipts WHERE order_id = ?1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                RepoError::Database(format!("Receipt for order #{order_id} vanished after insert"))
            })?;

        Ok((row, created))
    }

    pub async fn mark_emailed(&self, receipt_id: i64) -> RepoResult<()> {
        sqlx::query("UPDATE receipts SET emailed = 1 WHERE id = ?1")
            .bind(receipt_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_by_order(&self, order_id: i64) -> RepoResult<Option<ReceiptRow>> {
        let row = sqlx::query_as::<_, ReceiptRow>("SELECT * FROM receipts WHERE order_id = ?1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
