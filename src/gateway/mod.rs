//! Payment gateway seam.
//!
//! The payments use case talks to the gateway through [`PaymentGateway`] so
//! the HTTP client can be swapped for a fake in tests.

pub mod midtrans;

use async_trait::async_trait;

pub use midtrans::{MidtransClient, SnapRequest, SnapResponse};

/// Failures talking to the payment gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected gateway response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout for `request`, returning the token and redirect URL.
    async fn create_transaction(&self, request: &SnapRequest) -> Result<SnapResponse, GatewayError>;

    /// Server key used to verify notification signatures.
    fn server_key(&self) -> &str;
}
