//! Wallet HTTP handlers.
//!
//! This module implements wallet-related API endpoints:
//! - POST /api/v1/wallets - Create a wallet (tier-limited)
//! - GET /api/v1/wallets - List wallets with balances
//! - GET /api/v1/wallets/{id} - Get one wallet
//! - PATCH /api/v1/wallets/{id} - Rename
//! - DELETE /api/v1/wallets/{id} - Delete an empty wallet

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    config::Config,
    db::DbPool,
    error::AppError,
    extract::{AppJson, AppPath},
    middleware::auth::AuthContext,
    models::wallet::{CreateWalletRequest, UpdateWalletRequest, WalletResponse},
    services::wallet_service,
};

/// Create a new wallet.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "BCA Debit",
///   "wallet_type_id": 2,
///   "currency": "IDR",
///   "initial_balance": 1500000
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "id": "550e8400-...",
///   "name": "BCA Debit",
///   "wallet_type_id": 2,
///   "wallet_type": "card",
///   "currency": "IDR",
///   "balance": 1500000,
///   "created_at": "2025-01-15T08:00:00Z",
///   "updated_at": "2025-01-15T08:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 403 `wallet_limit_reached` on the free tier once the limit is hit
/// - 404 `wallet_type_not_found`
pub async fn create_wallet(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    Extension(auth): Extension<AuthContext>,
    AppJson(request): AppJson<CreateWalletRequest>,
) -> Result<(StatusCode, Json<WalletResponse>), AppError> {
    let wallet =
        wallet_service::create(&pool, auth.account_id, request, config.free_wallet_limit).await?;
    Ok((StatusCode::CREATED, Json(wallet)))
}

pub async fn list_wallets(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<WalletResponse>>, AppError> {
    Ok(Json(wallet_service::list(&pool, auth.account_id).await?))
}

pub async fn get_wallet(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<WalletResponse>, AppError> {
    Ok(Json(wallet_service::get(&pool, auth.account_id, id).await?))
}

pub async fn update_wallet(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateWalletRequest>,
) -> Result<Json<WalletResponse>, AppError> {
    Ok(Json(
        wallet_service::rename(&pool, auth.account_id, id, request).await?,
    ))
}

/// Delete a wallet. Answers 409 `wallet_not_empty` while it holds money.
pub async fn delete_wallet(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    wallet_service::delete(&pool, auth.account_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
