//! Customer and address models
//!
//! Accounts are owned by the auth service; these rows back ownership checks
//! and notification lookups.

use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: i64,
    #[serde(skip_serializing)]
    pub deleted_at: Option<i64>,
}

/// What order payloads expose about the customer
#[derive(Debug, Clone, Serialize)]
pub struct CustomerSummary {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
}

impl From<CustomerRow> for CustomerSummary {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AddressRow {
    pub id: i64,
    pub customer_id: i64,
    pub street: String,
    pub number: String,
    pub district: String,
    pub city: String,
    pub complement: Option<String>,
    pub created_at: i64,
    #[serde(skip_serializing)]
    pub deleted_at: Option<i64>,
}
