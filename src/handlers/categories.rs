//! Category HTTP handlers.
//!
//! - GET /api/v1/categories - Flat master list
//! - GET /api/v2/categories - Master tree plus personal categories
//! - POST /api/v2/categories - Create a personal category
//! - PATCH /api/v2/categories/{id} - Rename or re-icon a personal category
//! - DELETE /api/v2/categories/{id} - Delete a personal category

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
    models::category::{
        CategoriesV2Response, CategoryQuery, CreatePersonalCategoryRequest, MasterCategory,
        PersonalCategory, UpdatePersonalCategoryRequest,
    },
    services::category_service,
};

pub async fn list_categories_v1(
    State(pool): State<DbPool>,
    AppQuery(query): AppQuery<CategoryQuery>,
) -> Result<Json<Vec<MasterCategory>>, AppError> {
    Ok(Json(
        category_service::list_v1(&pool, query.transaction_type).await?,
    ))
}

/// # Response (200)
///
/// ```json
/// {
///   "categories": [
///     {
///       "id": 4,
///       "transaction_type": "spending",
///       "name": "Food & Drink",
///       "icon": "utensils",
///       "sub_categories": [{ "id": 1, "name": "Groceries", "icon": "cart" }]
///     }
///   ],
///   "personal": [
///     { "id": "9b2c...", "transaction_type": "spending", "name": "Pets", "icon": null, "created_at": "..." }
///   ]
/// }
/// ```
pub async fn list_categories_v2(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(query): AppQuery<CategoryQuery>,
) -> Result<Json<CategoriesV2Response>, AppError> {
    Ok(Json(
        category_service::list_v2(&pool, auth.account_id, query.transaction_type).await?,
    ))
}

pub async fn create_personal_category(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppJson(request): AppJson<CreatePersonalCategoryRequest>,
) -> Result<(StatusCode, Json<PersonalCategory>), AppError> {
    let category = category_service::create_personal(&pool, auth.account_id, request).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_personal_category(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdatePersonalCategoryRequest>,
) -> Result<Json<PersonalCategory>, AppError> {
    Ok(Json(
        category_service::update_personal(&pool, auth.account_id, id, request).await?,
    ))
}

pub async fn delete_personal_category(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    category_service::delete_personal(&pool, auth.account_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
