//! Payment Repository
//!
//! The conditional approval write is the single gate for webhook side
//! effects: whoever gets the row back won the `(not approved) → approved`
//! edge, so concurrent deliveries for the same payment cannot both trigger
//! confirmation.

use sqlx::SqlitePool;

use super::RepoResult;
use crate::db::models::{PaymentRow, PaymentStatus};

#[derive(Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, payment: &PaymentRow) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, customer_id, order_id, amount, status, gateway_id,
                                  pix_code, pix_qr_base64, expires_at, paid_at,
                                  created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&payment.id)
        .bind(payment.customer_id)
        .bind(payment.order_id)
        .bind(payment.amount)
        .bind(payment.status)
        .bind(&payment.gateway_id)
        .bind(&payment.pix_code)
        .bind(&payment.pix_qr_base64)
        .bind(payment.expires_at)
        .bind(payment.paid_at)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch one live payment by primary key
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<PaymentRow>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            "SELECT * FROM payments WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Webhook lookup: primary key first, gateway correlation id as fallback
    /// (the provider can only echo the correlation id for degraded-mode
    /// payments).
    pub async fn find_for_webhook(&self, external_id: &str) -> RepoResult<Option<PaymentRow>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            "SELECT * FROM payments WHERE (id = ?1 OR gateway_id = ?1) AND deleted_at IS NULL",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Approve iff not already approved; returns the row only to the caller
    /// that performed the transition. `paid_at` is stamped once.
    pub async fn approve_if_pending(&self, id: &str, now: i64) -> RepoResult<Option<PaymentRow>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            UPDATE payments
            SET status = 'approved', paid_at = COALESCE(paid_at, ?1), updated_at = ?1
            WHERE id = ?2 AND status <> 'approved' AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Write a non-approved status. An approved payment is never regressed.
    pub async fn set_status_if_not_approved(
        &self,
        id: &str,
        status: PaymentStatus,
        now: i64,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET status = ?1, updated_at = ?2
            WHERE id = ?3 AND status <> 'approved' AND deleted_at IS NULL
            "#,
        )
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
