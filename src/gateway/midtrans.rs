//! Midtrans Snap client.
//!
//! # Checkout
//!
//! `POST {snap_url}` with HTTP Basic auth (`server_key` as user, empty
//! password) and a JSON body:
//!
//! ```json
//! {
//!   "transaction_details": { "order_id": "SUB-1a2b3c4d-1736900000", "gross_amount": 29000 },
//!   "item_details": [{ "id": "premium_monthly", "price": 29000, "quantity": 1, "name": "Premium Monthly" }],
//!   "customer_details": { "first_name": "Budi", "email": "budi@example.com" }
//! }
//! ```
//!
//! A successful call answers `201` with `{"token": "...", "redirect_url": "..."}`.
//!
//! # Notifications
//!
//! Status callbacks carry `signature_key = hex(sha512(order_id + status_code + gross_amount + server_key))`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use hmac::digest::{CtOutput, Output};
use sha2::{Digest, Sha512};

use super::{GatewayError, PaymentGateway};

#[derive(Debug, Clone, Serialize)]
pub struct SnapRequest {
    pub transaction_details: TransactionDetails,
    pub item_details: Vec<ItemDetails>,
    pub customer_details: CustomerDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemDetails {
    pub id: String,
    pub price: i64,
    pub quantity: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Successful checkout response.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapResponse {
    pub token: String,
    pub redirect_url: String,
    /// Full response body as received, stored alongside the payment.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

/// HTTP client for the Snap API.
#[derive(Debug, Clone)]
pub struct MidtransClient {
    http: reqwest::Client,
    server_key: String,
    snap_url: String,
}

impl MidtransClient {
    pub fn new(server_key: String, snap_url: String, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            server_key,
            snap_url,
        })
    }
}

#[async_trait]
impl PaymentGateway for MidtransClient {
    async fn create_transaction(&self, request: &SnapRequest) -> Result<SnapResponse, GatewayError> {
        let response = self
            .http
            .post(&self.snap_url)
            .basic_auth(&self.server_key, None::<&str>)
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                order_id = %request.transaction_details.order_id,
                status = status.as_u16(),
                "Snap checkout rejected"
            );
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;
        let mut parsed: SnapResponse = serde_json::from_value(raw.clone())
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        parsed.raw = raw;

        Ok(parsed)
    }

    fn server_key(&self) -> &str {
        &self.server_key
    }
}

/// Compute the notification signature for the given fields.
pub fn notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare hex-encoded signatures as SHA-512 digests in constant time.
///
/// Anything that is not 128 hex digits never matches.
pub fn signature_matches(expected: &str, received: &str) -> bool {
    let (Ok(expected), Ok(received)) = (hex::decode(expected), hex::decode(received.trim())) else {
        return false;
    };
    let (Some(expected), Some(received)) = (
        Output::<Sha512>::from_exact_iter(expected),
        Output::<Sha512>::from_exact_iter(received),
    ) else {
        return false;
    };
    CtOutput::<Sha512>::new(expected) == CtOutput::new(received)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_sha512_hex_of_concatenation() {
        let sig = notification_signature("SUB-1", "200", "29000.00", "server-key");
        assert_eq!(sig.len(), 128);

        let mut hasher = Sha512::new();
        hasher.update(b"SUB-120029000.00server-key");
        assert_eq!(sig, hex::encode(hasher.finalize()));
    }

    #[test]
    fn signature_comparison() {
        let sig = notification_signature("SUB-1", "200", "29000.00", "server-key");
        assert!(signature_matches(&sig, &sig));
        assert!(signature_matches(&sig, &sig.to_uppercase()));
        assert!(!signature_matches(&sig, &sig[..64]));

        let other = notification_signature("SUB-1", "200", "29000.00", "other-key");
        assert!(!signature_matches(&sig, &other));
        assert!(!signature_matches(&sig, "not hex at all"));
        assert!(!signature_matches(&sig, ""));
    }

    #[test]
    fn snap_request_serializes_expected_shape() {
        let request = SnapRequest {
            transaction_details: TransactionDetails {
                order_id: "SUB-1".to_string(),
                gross_amount: 29000,
            },
            item_details: vec![ItemDetails {
                id: "premium_monthly".to_string(),
                price: 29000,
                quantity: 1,
                name: "Premium Monthly".to_string(),
            }],
            customer_details: CustomerDetails {
                first_name: "Budi".to_string(),
                email: "budi@example.com".to_string(),
                phone: None,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["transaction_details"]["gross_amount"], 29000);
        assert_eq!(json["item_details"][0]["quantity"], 1);
        assert!(json["customer_details"].get("phone").is_none());
    }
}
