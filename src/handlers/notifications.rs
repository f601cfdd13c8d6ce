//! Notification HTTP handlers.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    extract::{AppPath, AppQuery},
    middleware::auth::AuthContext,
    models::{
        Page,
        notification::{MarkedReadResponse, Notification, NotificationQuery, UnreadCountResponse},
    },
    services::notification_service,
};

/// `GET /api/v1/notifications?unread_only=true&page=1&per_page=20`
pub async fn list_notifications(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(query): AppQuery<NotificationQuery>,
) -> Result<Json<Page<Notification>>, AppError> {
    let page =
        notification_service::list(&pool, auth.account_id, query.unread_only, query.pagination())
            .await?;
    Ok(Json(page))
}

pub async fn unread_count(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    Ok(Json(
        notification_service::unread_count(&pool, auth.account_id).await?,
    ))
}

pub async fn mark_read(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    notification_service::mark_read(&pool, auth.account_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn mark_all_read(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<MarkedReadResponse>, AppError> {
    Ok(Json(
        notification_service::mark_all_read(&pool, auth.account_id).await?,
    ))
}

pub async fn delete_notification(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    notification_service::delete(&pool, auth.account_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
