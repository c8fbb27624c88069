//! Catalog models
//!
//! Read-only on the order path: the back-office owns catalog CRUD.

use serde::Serialize;

/// Sellable variant of a product (pizza size, bottle size, ...)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct VariantRow {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    /// Current price in minor units
    pub price: i64,
    pub created_at: i64,
}

/// Stuffed-crust option, pizza only
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CrustRow {
    pub id: i64,
    pub name: String,
    pub price_modifier: i64,
    pub created_at: i64,
}

/// Crust filling option, pizza only
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FillingRow {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub created_at: i64,
}
