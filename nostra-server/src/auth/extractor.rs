//! Identity extractors
//!
//! Authentication itself (JWT issuance/validation) lives in the upstream
//! auth layer, which injects the resolved identity as headers. Handlers pull
//! whichever extractor matches their access rule.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::core::ServerState;
use crate::utils::AppError;

const CUSTOMER_HEADER: &str = "x-customer-id";
const STAFF_HEADER: &str = "x-staff-id";

/// Authenticated storefront customer
#[derive(Debug, Clone, Copy)]
pub struct CurrentCustomer(pub i64);

/// Authenticated back-office staff member
#[derive(Debug, Clone, Copy)]
pub struct CurrentStaff(pub i64);

/// Either identity; used by endpoints serving both sides
#[derive(Debug, Clone, Copy)]
pub struct Caller {
    pub customer_id: Option<i64>,
    pub staff_id: Option<i64>,
}

impl Caller {
    pub fn is_staff(&self) -> bool {
        self.staff_id.is_some()
    }
}

fn header_id(parts: &Parts, name: &str) -> Option<i64> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

impl FromRequestParts<ServerState> for CurrentCustomer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        header_id(parts, CUSTOMER_HEADER)
            .map(CurrentCustomer)
            .ok_or(AppError::Unauthorized)
    }
}

impl FromRequestParts<ServerState> for CurrentStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        header_id(parts, STAFF_HEADER)
            .map(CurrentStaff)
            .ok_or_else(|| AppError::forbidden("Staff credentials required"))
    }
}

impl FromRequestParts<ServerState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let caller = Caller {
            customer_id: header_id(parts, CUSTOMER_HEADER),
            staff_id: header_id(parts, STAFF_HEADER),
        };
        if caller.customer_id.is_none() && caller.staff_id.is_none() {
            return Err(AppError::Unauthorized);
        }
        Ok(caller)
    }
}
