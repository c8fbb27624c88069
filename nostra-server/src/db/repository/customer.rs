//! Customer / Address Repository

use sqlx::SqlitePool;

use super::RepoResult;
use crate::db::models::{AddressRow, CustomerRow};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_customer(&self, id: i64) -> RepoResult<Option<CustomerRow>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT * FROM customers WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn find_address(&self, id: i64) -> RepoResult<Option<AddressRow>> {
        let row = sqlx::query_as::<_, AddressRow>(
            "SELECT * FROM addresses WHERE id = ?1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
