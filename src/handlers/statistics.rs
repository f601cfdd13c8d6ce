//! Statistics endpoints.

use axum::{Extension, Json, extract::State};

use crate::{
    db::DbPool,
    error::AppError,
    extract::AppQuery,
    middleware::auth::AuthContext,
    models::statistic::{
        CategoryBreakdownResponse, StatisticsQuery, SummaryResponse, TrendQuery, TrendResponse,
    },
    services::statistic_service,
};

/// `GET /api/v1/statistics/summary?period=2025-01`
pub async fn summary(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(query): AppQuery<StatisticsQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    Ok(Json(
        statistic_service::summary(&pool, auth.account_id, query).await?,
    ))
}

/// `GET /api/v1/statistics/categories?period=2025-01&transaction_type=spending`
pub async fn categories(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(query): AppQuery<StatisticsQuery>,
) -> Result<Json<CategoryBreakdownResponse>, AppError> {
    Ok(Json(
        statistic_service::categories(&pool, auth.account_id, query).await?,
    ))
}

/// `GET /api/v1/statistics/trend?months=6`
pub async fn trend(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(query): AppQuery<TrendQuery>,
) -> Result<Json<TrendResponse>, AppError> {
    Ok(Json(
        statistic_service::trend(&pool, auth.account_id, query).await?,
    ))
}
