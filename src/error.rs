//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use std::fmt;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::gateway::GatewayError;

/// Application-wide Result type.
pub type AppResult<T> = Result<T, AppError>;

/// Kinds of resources a lookup can miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Account,
    Wallet,
    WalletType,
    Transaction,
    Budget,
    Category,
    InvestmentItem,
    Plan,
    Payment,
    Notification,
    ReferralCode,
    Master,
}

impl Resource {
    fn code(self) -> &'static str {
        match self {
            Resource::Account => "account_not_found",
            Resource::Wallet => "wallet_not_found",
            Resource::WalletType => "wallet_type_not_found",
            Resource::Transaction => "transaction_not_found",
            Resource::Budget => "budget_not_found",
            Resource::Category => "category_not_found",
            Resource::InvestmentItem => "investment_item_not_found",
            Resource::Plan => "plan_not_found",
            Resource::Payment => "payment_not_found",
            Resource::Notification => "notification_not_found",
            Resource::ReferralCode => "referral_code_not_found",
            Resource::Master => "master_not_found",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Account => "Account",
            Resource::Wallet => "Wallet",
            Resource::WalletType => "Wallet type",
            Resource::Transaction => "Transaction",
            Resource::Budget => "Budget",
            Resource::Category => "Category",
            Resource::InvestmentItem => "Investment item",
            Resource::Plan => "Subscription plan",
            Resource::Payment => "Payment",
            Resource::Notification => "Notification",
            Resource::ReferralCode => "Referral code",
            Resource::Master => "Master data",
        };
        f.write_str(name)
    }
}

/// One entry of the `errors` list returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorItem {
    pub error_code: String,
    pub error_description: String,
}

impl ErrorItem {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error_code: code.into(),
            error_description: description.into(),
        }
    }
}

/// Error response body.
///
/// ```json
/// {
///   "errors": [
///     { "error_code": "invalid_email", "error_description": "email is not a valid address" }
///   ]
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorItem>,
}

/// Application-wide error type.
///
/// # Status Code Mapping
///
/// - `Validation`, `InvalidRequest` → 400 Bad Request
/// - `InvalidCredentials`, `InvalidToken` → 401 Unauthorized
/// - `InvalidSignature`, `WalletLimitReached` → 403 Forbidden
/// - `NotFound` → 404 Not Found
/// - `EmailAlreadyRegistered`, `BudgetAlreadyExists`, `WalletNotEmpty`,
///   `ReferralAlreadyApplied` → 409 Conflict
/// - `InsufficientBalance`, `InsufficientHolding` → 422 Unprocessable Entity
/// - `Database`, `Gateway`, `Internal` → 500 (details are logged, not returned)
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// One or more request fields failed validation.
    #[error("Validation failed")]
    Validation(Vec<ErrorItem>),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Missing or invalid access token")]
    InvalidToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("{0} not found")]
    NotFound(Resource),

    #[error("Email is already registered")]
    EmailAlreadyRegistered,

    #[error("A budget for this category and period already exists")]
    BudgetAlreadyExists,

    #[error("Wallet still holds a balance")]
    WalletNotEmpty,

    #[error("A referral code has already been applied to this account")]
    ReferralAlreadyApplied,

    #[error("Wallet limit of {limit} reached for the current plan")]
    WalletLimitReached { limit: i64 },

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Insufficient investment holding")]
    InsufficientHolding,

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a single-field validation failure.
    pub fn invalid_field(code: &str, description: impl Into<String>) -> Self {
        AppError::Validation(vec![ErrorItem::new(code, description)])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::InvalidSignature | AppError::WalletLimitReached { .. } => {
                StatusCode::FORBIDDEN
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyRegistered
            | AppError::BudgetAlreadyExists
            | AppError::WalletNotEmpty
            | AppError::ReferralAlreadyApplied => StatusCode::CONFLICT,
            AppError::InsufficientBalance | AppError::InsufficientHolding => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Database(_) | AppError::Gateway(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn items(self) -> Vec<ErrorItem> {
        let description = self.to_string();
        let code = match self {
            AppError::Validation(items) => return items,
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::InvalidSignature => "invalid_signature",
            AppError::NotFound(resource) => resource.code(),
            AppError::EmailAlreadyRegistered => "email_already_registered",
            AppError::BudgetAlreadyExists => "budget_already_exists",
            AppError::WalletNotEmpty => "wallet_not_empty",
            AppError::ReferralAlreadyApplied => "referral_already_applied",
            AppError::WalletLimitReached { .. } => "wallet_limit_reached",
            AppError::InsufficientBalance => "insufficient_balance",
            AppError::InsufficientHolding => "insufficient_holding",
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                return vec![ErrorItem::new(
                    "internal_error",
                    "An internal error occurred",
                )];
            }
            AppError::Gateway(e) => {
                tracing::error!("Payment gateway error: {:?}", e);
                return vec![ErrorItem::new(
                    "payment_gateway_error",
                    "The payment gateway could not process the request",
                )];
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                return vec![ErrorItem::new(
                    "internal_error",
                    "An internal error occurred",
                )];
            }
        };
        vec![ErrorItem::new(code, description)]
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            errors: self.items(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid_field("invalid_body", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::invalid_field("invalid_query", rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::invalid_field("invalid_path", rejection.body_text())
    }
}

/// True when a write failed on a UNIQUE constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn not_found_uses_resource_code() {
        let (status, body) = body_of(AppError::NotFound(Resource::Wallet)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body.errors,
            vec![ErrorItem::new("wallet_not_found", "Wallet not found")]
        );
    }

    #[tokio::test]
    async fn validation_returns_every_item() {
        let err = AppError::Validation(vec![
            ErrorItem::new("invalid_email", "email is not a valid address"),
            ErrorItem::new("weak_password", "password is too short"),
        ]);
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.errors.len(), 2);
        assert_eq!(body.errors[1].error_code, "weak_password");
    }

    #[tokio::test]
    async fn database_errors_hide_details() {
        let (status, body) = body_of(AppError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.errors[0].error_code, "internal_error");
        assert!(!body.errors[0].error_description.contains("RowNotFound"));
    }

    #[test]
    fn business_rule_statuses() {
        assert_eq!(
            AppError::InsufficientBalance.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::WalletLimitReached { limit: 2 }.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::BudgetAlreadyExists.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
    }
}
