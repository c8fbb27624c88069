//! Payment models

use serde::{Deserialize, Serialize};

/// Internal payment status vocabulary
///
/// The gateway speaks a wider vocabulary; [`PaymentStatus::from_provider`]
/// is the single total mapping between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    /// Map the provider status vocabulary to ours.
    ///
    /// Total by construction: vocabulary the gateway adds later lands on
    /// `pending` instead of failing the webhook.
    pub fn from_provider(provider_status: &str) -> Self {
        match provider_status {
            "approved" => PaymentStatus::Approved,
            "pending" | "in_process" => PaymentStatus::Pending,
            "rejected" => PaymentStatus::Rejected,
            "cancelled" => PaymentStatus::Cancelled,
            "refunded" | "charged_back" => PaymentStatus::Refunded,
            _ => PaymentStatus::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One payment attempt
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentRow {
    pub id: String,
    pub customer_id: i64,
    pub order_id: Option<i64>,
    pub amount: i64,
    pub status: PaymentStatus,
    pub gateway_id: Option<String>,
    pub pix_code: Option<String>,
    pub pix_qr_base64: Option<String>,
    pub expires_at: Option<i64>,
    pub paid_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing)]
    pub deleted_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_mapping_matches_the_fixed_table() {
        assert_eq!(
            PaymentStatus::from_provider("approved"),
            PaymentStatus::Approved
        );
        assert_eq!(
            PaymentStatus::from_provider("pending"),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentStatus::from_provider("in_process"),
            PaymentStatus::Pending
        );
        assert_eq!(
            PaymentStatus::from_provider("rejected"),
            PaymentStatus::Rejected
        );
        assert_eq!(
            PaymentStatus::from_provider("cancelled"),
            PaymentStatus::Cancelled
        );
        assert_eq!(
            PaymentStatus::from_provider("refunded"),
            PaymentStatus::Refunded
        );
        assert_eq!(
            PaymentStatus::from_provider("charged_back"),
            PaymentStatus::Refunded
        );
    }

    #[test]
    fn unknown_provider_status_falls_back_to_pending() {
        assert_eq!(
            PaymentStatus::from_provider("authorized_pending_capture"),
            PaymentStatus::Pending
        );
        assert_eq!(PaymentStatus::from_provider(""), PaymentStatus::Pending);
        // Mapping is case-sensitive like the provider docs
        assert_eq!(
            PaymentStatus::from_provider("APPROVED"),
            PaymentStatus::Pending
        );
    }
}
