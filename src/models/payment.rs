//! Payment models for subscription checkouts and gateway notifications.
//!
//! # Payment Flow
//!
//! 1. Client requests a checkout via `POST /api/v1/payments/subscriptions`
//! 2. Server opens a Snap transaction and stores the payment as `pending`
//! 3. The gateway calls `POST /api/v1/payments/notifications` on status changes
//! 4. A signed `settlement` notification activates the subscription

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Settlement,
    Failed,
    Expired,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Settlement => "settlement",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses that no later notification may change.
    pub fn is_final(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    /// Map a gateway `transaction_status` (and `fraud_status` for card
    /// captures) onto our status. Unknown values yield `None`.
    pub fn from_gateway(transaction_status: &str, fraud_status: Option<&str>) -> Option<Self> {
        match transaction_status {
            "capture" => match fraud_status {
                Some("challenge") => Some(PaymentStatus::Pending),
                Some("deny") => Some(PaymentStatus::Failed),
                _ => Some(PaymentStatus::Settlement),
            },
            "settlement" => Some(PaymentStatus::Settlement),
            "pending" => Some(PaymentStatus::Pending),
            "deny" | "failure" => Some(PaymentStatus::Failed),
            "expire" => Some(PaymentStatus::Expired),
            "cancel" | "refund" | "partial_refund" => Some(PaymentStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "settlement" => Ok(PaymentStatus::Settlement),
            "failed" => Ok(PaymentStatus::Failed),
            "expired" => Ok(PaymentStatus::Expired),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            other => Err(format!("unknown payment status {other:?}")),
        }
    }
}

/// Payment row from the `payments` table.
///
/// `gateway_response` keeps the raw checkout response for support
/// investigations and is never returned to clients.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub account_id: Uuid,
    pub plan_id: i32,
    pub order_id: String,
    pub gross_amount: i64,
    pub status: String,
    pub payment_type: Option<String>,
    pub snap_token: Option<String>,
    pub redirect_url: Option<String>,
    pub gateway_response: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to buy a subscription plan.
///
/// ```json
/// { "plan_id": 1 }
/// ```
#[derive(Debug, Deserialize, Serialize)]
pub struct SubscriptionCheckoutRequest {
    pub plan_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub order_id: String,
    pub plan_id: i32,
    pub gross_amount: i64,
    pub status: String,
    pub payment_type: Option<String>,
    pub snap_token: Option<String>,
    pub redirect_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            order_id: payment.order_id,
            plan_id: payment.plan_id,
            gross_amount: payment.gross_amount,
            status: payment.status,
            payment_type: payment.payment_type,
            snap_token: payment.snap_token,
            redirect_url: payment.redirect_url,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

/// Status notification posted by the gateway.
///
/// ```json
/// {
///   "order_id": "SUB-1a2b3c4d-1736900000-7f3a",
///   "status_code": "200",
///   "gross_amount": "29000.00",
///   "signature_key": "9f2c...",
///   "transaction_status": "settlement",
///   "payment_type": "bank_transfer"
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationAck {
    pub order_id: String,
    pub status: PaymentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_status_mapping() {
        assert_eq!(
            PaymentStatus::from_gateway("settlement", None),
            Some(PaymentStatus::Settlement)
        );
        assert_eq!(
            PaymentStatus::from_gateway("capture", Some("accept")),
            Some(PaymentStatus::Settlement)
        );
        assert_eq!(
            PaymentStatus::from_gateway("capture", Some("challenge")),
            Some(PaymentStatus::Pending)
        );
        assert_eq!(
            PaymentStatus::from_gateway("expire", None),
            Some(PaymentStatus::Expired)
        );
        assert_eq!(
            PaymentStatus::from_gateway("cancel", None),
            Some(PaymentStatus::Cancelled)
        );
        assert_eq!(PaymentStatus::from_gateway("authorize", None), None);
    }

    #[test]
    fn only_pending_is_open() {
        assert!(!PaymentStatus::Pending.is_final());
        assert!(PaymentStatus::Settlement.is_final());
        assert!(PaymentStatus::Expired.is_final());
    }
}
