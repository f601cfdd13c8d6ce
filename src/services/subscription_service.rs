//! Subscription plans and premium activation.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult, Resource},
    models::subscription::{MySubscriptionResponse, SubscriptionPlan, extend_subscription},
    repositories::{account_repository, master_repository, subscription_repository},
};

pub async fn plans(pool: &DbPool) -> AppResult<Vec<SubscriptionPlan>> {
    Ok(master_repository::list_plans(pool).await?)
}

pub async fn mine(pool: &DbPool, account_id: Uuid) -> AppResult<MySubscriptionResponse> {
    let account = account_repository::find_by_id(pool, account_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Account))?;
    let history = subscription_repository::list(pool, account_id).await?;

    Ok(MySubscriptionResponse {
        role: account.tier(Utc::now()),
        subscription_expires_at: account.subscription_expires_at,
        history,
    })
}

/// Grant `plan` to the account for the payment `payment_id`.
///
/// Must run inside the caller's transaction. Locks the account row, stacks
/// the plan's months on top of any remaining premium time and records the
/// period. Returns the new expiry.
pub async fn activate(
    conn: &mut PgConnection,
    account_id: Uuid,
    plan: &SubscriptionPlan,
    payment_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<DateTime<Utc>> {
    let account = account_repository::lock_by_id(&mut *conn, account_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Account))?;

    let months = u32::try_from(plan.duration_months)
        .map_err(|_| AppError::Internal(format!("plan {} has a negative duration", plan.code)))?;
    let (starts_at, ends_at) = extend_subscription(account.subscription_expires_at, now, months)
        .ok_or_else(|| AppError::Internal("subscription end date out of range".to_string()))?;

    subscription_repository::insert(&mut *conn, account_id, plan.id, payment_id, starts_at, ends_at).await?;
    account_repository::set_subscription_expiry(&mut *conn, account_id, ends_at).await?;

    tracing::info!(%account_id, plan = %plan.code, %ends_at, "Subscription activated");
    Ok(ends_at)
}
