//! Budget HTTP handlers.

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
    models::budget::{BudgetQuery, BudgetResponse, CreateBudgetRequest, UpdateBudgetRequest},
    services::budget_service,
};

/// Create a monthly budget.
///
/// # Request Body
///
/// ```json
/// { "category_id": 4, "period": "2025-01", "amount": 1500000 }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "id": "880e8400-...",
///   "category_id": 4,
///   "category_name": "Food & Drink",
///   "period": "2025-01",
///   "amount": 1500000,
///   "spent": 450000,
///   "remaining": 1050000,
///   "usage_percent": 30.0,
///   "is_exceeded": false
/// }
/// ```
pub async fn create_budget(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppJson(request): AppJson<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<BudgetResponse>), AppError> {
    let budget = budget_service::create(&pool, auth.account_id, request).await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn list_budgets(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(query): AppQuery<BudgetQuery>,
) -> Result<Json<Vec<BudgetResponse>>, AppError> {
    Ok(Json(budget_service::list(&pool, auth.account_id, query).await?))
}

pub async fn get_budget(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<BudgetResponse>, AppError> {
    Ok(Json(budget_service::get(&pool, auth.account_id, id).await?))
}

pub async fn update_budget(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateBudgetRequest>,
) -> Result<Json<BudgetResponse>, AppError> {
    Ok(Json(
        budget_service::update(&pool, auth.account_id, id, request).await?,
    ))
}

pub async fn delete_budget(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    budget_service::delete(&pool, auth.account_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
