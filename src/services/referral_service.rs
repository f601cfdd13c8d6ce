//! Referral codes and the multi-level referral tree.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult, Resource},
    models::referral::{ApplyReferralRequest, ReferralOverview, ReferralTiersResponse, build_tiers},
    repositories::referral_repository,
    services::account_service::normalize_code,
};

pub async fn overview(pool: &DbPool, account_id: Uuid) -> AppResult<ReferralOverview> {
    let reward = referral_repository::find_by_account(pool, account_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Account))?;
    let direct_referrals = referral_repository::count_direct(pool, &reward.referral_code).await?;

    Ok(ReferralOverview {
        referral_code: reward.referral_code,
        referred_by: reward.referred_by,
        direct_referrals,
    })
}

/// Attach a referrer to an account that has none yet.
///
/// # Errors
///
/// - `Validation`: empty code, own code, or a code from the account's own
///   downline (which would close a cycle)
/// - `NotFound(ReferralCode)`: no active account owns the code
/// - `ReferralAlreadyApplied`: the account already has a referrer
pub async fn apply(pool: &DbPool, account_id: Uuid, request: ApplyReferralRequest) -> AppResult<ReferralOverview> {
    let code = normalize_code(Some(&request.referral_code)).ok_or_else(|| {
        AppError::invalid_field("referral_code_required", "referral_code must not be empty")
    })?;

    let mut tx = pool.begin().await?;
    referral_repository::lock_tree(&mut *tx).await?;

    let own = referral_repository::lock_by_account(&mut *tx, account_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Account))?;

    if own.referred_by.is_some() {
        return Err(AppError::ReferralAlreadyApplied);
    }
    if own.referral_code == code {
        return Err(AppError::invalid_field(
            "self_referral",
            "an account cannot refer itself",
        ));
    }

    let referrer = referral_repository::find_by_code(&mut *tx, &code)
        .await?
        .ok_or(AppError::NotFound(Resource::ReferralCode))?;

    if referral_repository::is_in_downline(&mut *tx, &own.referral_code, &referrer.referral_code).await? {
        return Err(AppError::invalid_field(
            "referral_cycle",
            "the referrer is already in this account's downline",
        ));
    }

    if referral_repository::set_referred_by(&mut *tx, account_id, &referrer.referral_code).await? == 0 {
        return Err(AppError::ReferralAlreadyApplied);
    }

    tx.commit().await?;

    tracing::info!(%account_id, referrer = %referrer.account_id, "Referral applied");
    overview(pool, account_id).await
}

/// Downline grouped into commission tiers.
///
/// The depth of the walk equals the number of configured tier rates.
pub async fn tiers(pool: &DbPool, account_id: Uuid, rates_bps: &[i64]) -> AppResult<ReferralTiersResponse> {
    let reward = referral_repository::find_by_account(pool, account_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Account))?;

    let max_depth = i32::try_from(rates_bps.len())
        .map_err(|_| AppError::Internal("too many referral tiers configured".to_string()))?;
    let rows = referral_repository::downline(pool, &reward.referral_code, max_depth).await?;

    let tiers = build_tiers(rows, rates_bps, Utc::now());
    let total_commission = tiers.iter().map(|t| t.commission).sum();

    Ok(ReferralTiersResponse {
        referral_code: reward.referral_code,
        tiers,
        total_commission,
    })
}
