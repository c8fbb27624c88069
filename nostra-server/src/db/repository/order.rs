//! Order Repository
//!
//! All order mutations go through OrderStore; this layer owns the SQL.

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use crate::db::models::{
    AddressRow, CustomerRow, NewOrder, NewOrderItem, OrderDetail, OrderItemDetail, OrderRow,
    OrderStatus, OrderStatusHistoryRow,
};
use crate::orders::number::order_number;

const ITEM_DETAIL_SQL: &str = r#"
    SELECT oi.id, oi.order_id, oi.product_id, oi.variant_id, oi.crust_id, oi.filling_id,
           oi.quantity, oi.unit_price, oi.crust_price, oi.filling_price, oi.line_total, oi.notes,
           p.name AS product_name, v.name AS variant_name,
           c.name AS crust_name, f.name AS filling_name
    FROM order_items oi
    JOIN products p ON p.id = oi.product_id
    JOIN product_variants v ON v.id = oi.variant_id
    LEFT JOIN pizza_crusts c ON c.id = oi.crust_id
    LEFT JOIN crust_fillings f ON f.id = oi.filling_id
    WHERE oi.order_id = ?1
    ORDER BY oi.id
"#;

#[derive(Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a complete order atomically: row, order number, items, initial
    /// history entry. Either everything commits or nothing does.
    ///
    /// The order number needs the database-assigned id, so it is patched in a
    /// second statement inside the same transaction.
    pub async fn create_order(
        &self,
        order: &NewOrder,
        items: &[NewOrderItem],
        now: i64,
    ) -> RepoResult<i64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO orders (customer_id, address_id, status, subtotal, delivery_fee,
                                discount, total, payment_method, notes, delivery_token,
                                estimated_time, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
            "#,
        )
        .bind(order.customer_id)
        .bind(order.address_id)
        .bind(OrderStatus::Pending)
        .bind(order.subtotal)
        .bind(order.delivery_fee)
        .bind(order.discount)
        .bind(order.total)
        .bind(order.payment_method)
        .bind(&order.notes)
        .bind(&order.delivery_token)
        .bind(order.estimated_time)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let order_id = result.last_insert_rowid();
        let number = order_number(order_id);

        sqlx::query("UPDATE orders SET order_number = ?1 WHERE id = ?2")
            .bind(&number)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, variant_id, crust_id, filling_id,
                                         quantity, unit_price, crust_price, filling_price,
                                         line_total, notes, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.variant_id)
            .bind(item.crust_id)
            .bind(item.filling_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.crust_price)
            .bind(item.filling_price)
            .bind(item.line_total)
            .bind(&item.notes)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO order_status_history (order_id, status, notes, created_by, created_at)
            VALUES (?1, ?2, ?3, NULL, ?4)
            "#,
        )
        .bind(order_id)
        .bind(OrderStatus::Pending)
        .bind(format!("Order placed by customer - #{number}"))
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order_id)
    }

    /// Fetch one live order row
    pub async fn find_row(&self, order_id: i64) -> RepoResult<Option<OrderRow>> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Fetch one live order with items, address and customer resolved
    pub async fn find_detail(&self, order_id: i64) -> RepoResult<Option<OrderDetail>> {
        let Some(order) = self.find_row(order_id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemDetail>(ITEM_DETAIL_SQL)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        let address = sqlx::query_as::<_, AddressRow>("SELECT * FROM addresses WHERE id = ?1")
            .bind(order.address_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                RepoError::Database(format!(
                    "Order #{order_id} references missing address {}",
                    order.address_id
                ))
            })?;

        let customer = sqlx::query_as::<_, CustomerRow>("SELECT * FROM customers WHERE id = ?1")
            .bind(order.customer_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                RepoError::Database(format!(
                    "Order #{order_id} references missing customer {}",
                    order.customer_id
                ))
            })?;

        Ok(Some(OrderDetail {
            order,
            items,
            address,
            customer: customer.into(),
        }))
    }

    /// All live orders of one customer, newest first
    pub async fn list_by_customer(&self, customer_id: i64) -> RepoResult<Vec<OrderRow>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT * FROM orders
            WHERE customer_id = ?1 AND deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All live orders, newest first (back-office)
    pub async fn list_all(&self) -> RepoResult<Vec<OrderRow>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT * FROM orders WHERE deleted_at IS NULL ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Write the new status and stamp its timestamp column on first entry.
    ///
    /// `COALESCE` keeps an already-set stamp untouched, so each `*_at`
    /// column is written at most once over the order's lifetime.
    pub async fn update_status(
        &self,
        order_id: i64,
        status: OrderStatus,
        now: i64,
    ) -> RepoResult<OrderRow> {
        // stamp_column() returns fixed identifiers, never request input
        let sql = match status.stamp_column() {
            Some(col) => format!(
                "UPDATE orders SET status = ?1, updated_at = ?2, {col} = COALESCE({col}, ?2) \
                 WHERE id = ?3 AND deleted_at IS NULL RETURNING *"
            ),
            None => "UPDATE orders SET status = ?1, updated_at = ?2 \
                     WHERE id = ?3 AND deleted_at IS NULL RETURNING *"
                .to_string(),
        };

        sqlx::query_as::<_, OrderRow>(&sql)
            .bind(status)
            .bind(now)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order #{order_id} not found")))
    }

    /// Append one audit row
    pub async fn append_history(
        &self,
        order_id: i64,
        status: OrderStatus,
        notes: Option<&str>,
        created_by: Option<i64>,
        now: i64,
    ) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO order_status_history (order_id, status, notes, created_by, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(order_id)
        .bind(status)
        .bind(notes)
        .bind(created_by)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Audit trail of one order, oldest first
    pub async fn history_for(&self, order_id: i64) -> RepoResult<Vec<OrderStatusHistoryRow>> {
        let rows = sqlx::query_as::<_, OrderStatusHistoryRow>(
            "SELECT * FROM order_status_history WHERE order_id = ?1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Tombstone an order. Rows are never hard-deleted.
    pub async fn soft_delete(&self, order_id: i64, now: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE orders SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(order_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
