//! Referral HTTP handlers.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};

use crate::{
    config::Config,
    db::DbPool,
    error::AppError,
    extract::AppJson,
    middleware::auth::AuthContext,
    models::referral::{ApplyReferralRequest, ReferralOverview, ReferralTiersResponse},
    services::referral_service,
};

pub async fn get_referral(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ReferralOverview>, AppError> {
    Ok(Json(referral_service::overview(&pool, auth.account_id).await?))
}

pub async fn apply_referral(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppJson(request): AppJson<ApplyReferralRequest>,
) -> Result<Json<ReferralOverview>, AppError> {
    Ok(Json(
        referral_service::apply(&pool, auth.account_id, request).await?,
    ))
}

/// Downline per tier with the commission each tier earns.
///
/// # Response (200)
///
/// ```json
/// {
///   "referral_code": "K7QM2XPA",
///   "tiers": [
///     {
///       "level": 1,
///       "members": [{ "account_id": "...", "name": "Sari", "is_premium": true, "paid_amount": 29000 }],
///       "subscribed_members": 1,
///       "volume": 29000,
///       "rate_bps": 1000,
///       "commission": 2900
///     }
///   ],
///   "total_commission": 2900
/// }
/// ```
pub async fn get_tiers(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ReferralTiersResponse>, AppError> {
    Ok(Json(
        referral_service::tiers(&pool, auth.account_id, &config.referral_tier_rates_bps).await?,
    ))
}
