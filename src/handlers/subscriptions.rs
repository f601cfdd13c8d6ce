//! Subscription HTTP handlers.

use axum::{Extension, Json, extract::State};

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::AuthContext,
    models::subscription::{MySubscriptionResponse, SubscriptionPlan},
    services::subscription_service,
};

pub async fn list_plans(State(pool): State<DbPool>) -> Result<Json<Vec<SubscriptionPlan>>, AppError> {
    Ok(Json(subscription_service::plans(&pool).await?))
}

pub async fn my_subscription(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<MySubscriptionResponse>, AppError> {
    Ok(Json(subscription_service::mine(&pool, auth.account_id).await?))
}
