//! Identity extraction
//!
//! Token validation happens upstream; see [`extractor`].

pub mod extractor;

pub use extractor::{Caller, CurrentCustomer, CurrentStaff};
