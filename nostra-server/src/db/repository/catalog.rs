//! Catalog Repository
//!
//! Read-only price lookups for the pricing resolver.

use sqlx::SqlitePool;

use super::RepoResult;
use crate::db::models::{CrustRow, FillingRow, VariantRow};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_variant(&self, id: i64) -> RepoResult<Option<VariantRow>> {
        let row = sqlx::query_as::<_, VariantRow>("SELECT * FROM product_variants WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_crust(&self, id: i64) -> RepoResult<Option<CrustRow>> {
        let row = sqlx::query_as::<_, CrustRow>("SELECT * FROM pizza_crusts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn find_filling(&self, id: i64) -> RepoResult<Option<FillingRow>> {
        let row = sqlx::query_as::<_, FillingRow>("SELECT * FROM crust_fillings WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
