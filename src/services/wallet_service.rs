//! Wallet use cases.
//!
//! # Wallet Limit
//!
//! Free accounts may hold a limited number of active wallets; premium
//! accounts are unlimited. Creation locks the account row first, so two
//! concurrent requests cannot both pass the count check.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult, Resource},
    models::wallet::{CreateWalletRequest, UpdateWalletRequest, WalletResponse},
    repositories::{account_repository, master_repository, wallet_repository},
    validation::{MAX_AMOUNT, Validator},
};

/// Create a wallet together with its balance row.
///
/// # Errors
///
/// - `Validation`: bad name, currency or initial balance
/// - `WalletLimitReached`: free tier already at `free_wallet_limit`
/// - `NotFound(WalletType)`: unknown `wallet_type_id`
pub async fn create(
    pool: &DbPool,
    account_id: Uuid,
    request: CreateWalletRequest,
    free_wallet_limit: i64,
) -> AppResult<WalletResponse> {
    let currency = request.currency.trim().to_ascii_uppercase();
    Validator::new()
        .text("name", &request.name, 100)
        .check(
            currency.len() == 3 && currency.bytes().all(|b| b.is_ascii_uppercase()),
            "invalid_currency",
            "currency must be a 3-letter ISO 4217 code",
        )
        .check(
            (0..=MAX_AMOUNT).contains(&request.initial_balance),
            "invalid_initial_balance",
            "initial_balance must not be negative",
        )
        .finish()?;

    let mut tx = pool.begin().await?;

    let account = account_repository::lock_by_id(&mut *tx, account_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Account))?;

    if let Some(limit) = account.tier(Utc::now()).wallet_limit(free_wallet_limit) {
        let active = wallet_repository::count_active(&mut *tx, account_id).await?;
        if active >= limit {
            tx.rollback().await?;
            return Err(AppError::WalletLimitReached { limit });
        }
    }

    master_repository::find_wallet_type(&mut *tx, request.wallet_type_id)
        .await?
        .ok_or(AppError::NotFound(Resource::WalletType))?;

    let wallet_id = wallet_repository::insert_wallet(
        &mut *tx,
        account_id,
        request.wallet_type_id,
        request.name.trim(),
        &currency,
    )
    .await?;
    wallet_repository::insert_balance(&mut *tx, wallet_id, request.initial_balance).await?;

    let wallet = wallet_repository::find(&mut *tx, account_id, wallet_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Wallet))?;

    tx.commit().await?;

    tracing::info!(%account_id, %wallet_id, wallet_type = %wallet.wallet_type_code, "Wallet created");
    Ok(wallet.into())
}

pub async fn list(pool: &DbPool, account_id: Uuid) -> AppResult<Vec<WalletResponse>> {
    let wallets = wallet_repository::list(pool, account_id).await?;
    Ok(wallets.into_iter().map(Into::into).collect())
}

pub async fn get(pool: &DbPool, account_id: Uuid, wallet_id: Uuid) -> AppResult<WalletResponse> {
    wallet_repository::find(pool, account_id, wallet_id)
        .await?
        .map(Into::into)
        .ok_or(AppError::NotFound(Resource::Wallet))
}

pub async fn rename(
    pool: &DbPool,
    account_id: Uuid,
    wallet_id: Uuid,
    request: UpdateWalletRequest,
) -> AppResult<WalletResponse> {
    Validator::new().text("name", &request.name, 100).finish()?;

    if wallet_repository::rename(pool, account_id, wallet_id, request.name.trim()).await? == 0 {
        return Err(AppError::NotFound(Resource::Wallet));
    }
    get(pool, account_id, wallet_id).await
}

/// Soft-delete an empty wallet.
///
/// # Errors
///
/// - `WalletNotEmpty`: the balance is not zero; move the money out first
pub async fn delete(pool: &DbPool, account_id: Uuid, wallet_id: Uuid) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let wallet = wallet_repository::lock(&mut *tx, account_id, wallet_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Wallet))?;

    if wallet.balance != 0 {
        tx.rollback().await?;
        return Err(AppError::WalletNotEmpty);
    }

    wallet_repository::soft_delete(&mut *tx, account_id, wallet_id).await?;
    tx.commit().await?;

    tracing::info!(%account_id, %wallet_id, "Wallet deleted");
    Ok(())
}
