//! Sign-in activity endpoint.

use axum::{Extension, Json, extract::State};

use crate::{
    db::DbPool,
    error::AppError,
    extract::AppQuery,
    middleware::auth::AuthContext,
    models::{Page, Pagination, track::Track},
    services::track_service,
};

/// `GET /api/v1/tracks?page=1&per_page=20`, newest first.
pub async fn list_tracks(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppQuery(pagination): AppQuery<Pagination>,
) -> Result<Json<Page<Track>>, AppError> {
    Ok(Json(
        track_service::list(&pool, auth.account_id, pagination).await?,
    ))
}
