//! Transaction HTTP handlers.
//!
//! This module implements transaction-related API endpoints:
//! - POST /api/v1/transactions - Record income or spending
//! - POST /api/v1/transactions/transfer - Move money between own wallets
//! - GET /api/v1/transactions - Filtered, paginated history
//! - GET /api/v1/transactions/{id} - Get transaction with detail
//! - DELETE /api/v1/transactions/{id} - Delete and reverse balances

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    extract::{AppJson, AppPath, AppQuery},
    middleware::auth::AuthContext,
    models::{
        Page,
        transaction::{CreateTransactionRequest, TransactionFilter, TransactionResponse, TransferRequest},
    },
    services::transaction_service,
};

/// Record income or spending on a wallet.
///
/// # Request Body
///
/// ```json
/// {
///   "wallet_id": "550e8400-...",
///   "transaction_type": "spending",
///   "amount": 45000,
///   "category_id": 4,
///   "description": "Lunch",
///   "note": "with the team"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "id": "770e8400-...",
///   "wallet_id": "550e8400-...",
///   "transaction_type": "spending",
///   "category_id": 4,
///   "personal_category_id": null,
///   "category_name": "Food & Drink",
///   "amount": 45000,
///   "description": "Lunch",
///   "transaction_at": "2025-01-15T05:12:00Z",
///   "created_at": "2025-01-15T05:12:00Z",
///   "detail": { "note": "with the team", ... }
/// }
/// ```
///
/// # Errors
///
/// - 422 `insufficient_balance` if a spending exceeds the wallet balance
pub async fn create_transaction(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppJson(request): AppJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let record = transaction_service::create(&pool, auth.account_id, request).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Transfer between two wallets of the authenticated account.
///
/// # Request Body
///
/// ```json
/// {
///   "from_wallet_id": "550e8400-...",
///   "to_wallet_id": "660e8400-...",
///   "amount": 250000,
///   "description": "Top up e-wallet"
/// }
/// ```
pub async fn create_transfer(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppJson(request): AppJson<TransferRequest>,
) -> Result<(StatusCode, Json<TransactionResponse>), AppError> {
    let record = transaction_service::transfer(&pool, auth.account_id, request).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// `GET /api/v1/transactions?wallet_id=&transaction_type=&from=2025-01-01&to=2025-01-31&page=1&per_page=20`
pub async fn list_transactions(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(filter): AppQuery<TransactionFilter>,
) -> Result<Json<Page<TransactionResponse>>, AppError> {
    let page = transaction_service::list(&pool, auth.account_id, filter).await?;
    Ok(Json(page.map(Into::into)))
}

pub async fn get_transaction(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    let record = transaction_service::get(&pool, auth.account_id, id).await?;
    Ok(Json(record.into()))
}

pub async fn delete_transaction(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    transaction_service::delete(&pool, auth.account_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
