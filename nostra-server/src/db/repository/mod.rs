//! Repository Module
//!
//! SQL access per table. Domain invariants (transition table, pricing,
//! webhook gating) live in the services that sit on top.

pub mod catalog;
pub mod customer;
pub mod order;
pub mod payment;
pub mod receipt;

pub use catalog::CatalogRepository;
pub use customer::CustomerRepository;
pub use order::OrderRepository;
pub use payment::PaymentRepository;
pub use receipt::ReceiptRepository;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
