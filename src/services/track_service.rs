//! Sign-in activity.

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppResult,
    models::{Page, Pagination, track::Track},
    repositories::track_repository,
};

/// Sign-ins of the account, newest first.
pub async fn list(pool: &DbPool, account_id: Uuid, pagination: Pagination) -> AppResult<Page<Track>> {
    let items = track_repository::list(pool, account_id, pagination.limit(), pagination.offset()).await?;
    let total = track_repository::count(pool, account_id).await?;
    Ok(Page::new(items, pagination, total))
}
