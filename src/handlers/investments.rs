//! Investment HTTP handlers.
//!
//! - POST /api/v1/investments/buy
//! - POST /api/v1/investments/sell
//! - GET /api/v1/investments - Order history
//! - GET /api/v1/investments/portfolio - Current holdings

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    db::DbPool,
    error::AppError,
    extract::{AppJson, AppQuery},
    middleware::auth::AuthContext,
    models::{
        Page,
        investment::{Investment, InvestmentOrderRequest, InvestmentQuery, InvestmentSide, PortfolioResponse},
    },
    services::investment_service,
};

pub async fn buy(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppJson(request): AppJson<InvestmentOrderRequest>,
) -> Result<(StatusCode, Json<Investment>), AppError> {
    let investment =
        investment_service::place_order(&pool, auth.account_id, InvestmentSide::Buy, request).await?;
    Ok((StatusCode::CREATED, Json(investment)))
}

/// Sell part of a holding. Answers 422 `insufficient_holding` when selling
/// more than is held.
pub async fn sell(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppJson(request): AppJson<InvestmentOrderRequest>,
) -> Result<(StatusCode, Json<Investment>), AppError> {
    let investment =
        investment_service::place_order(&pool, auth.account_id, InvestmentSide::Sell, request).await?;
    Ok((StatusCode::CREATED, Json(investment)))
}

pub async fn list_investments(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(query): AppQuery<InvestmentQuery>,
) -> Result<Json<Page<Investment>>, AppError> {
    Ok(Json(
        investment_service::list(&pool, auth.account_id, query).await?,
    ))
}

/// # Response (200)
///
/// ```json
/// {
///   "holdings": [
///     {
///       "investment_item_id": 1,
///       "item_name": "Gold",
///       "unit": "gram",
///       "quantity": "2.5",
///       "cost_basis": 2875000,
///       "average_price": "1150000"
///     }
///   ],
///   "total_cost_basis": 2875000
/// }
/// ```
pub async fn portfolio(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<PortfolioResponse>, AppError> {
    Ok(Json(investment_service::portfolio(&pool, auth.account_id).await?))
}
