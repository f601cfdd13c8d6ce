//! In-app notifications.
//!
//! Other use cases call [`notify`] to leave a message for an account;
//! the remaining functions back the notification endpoints.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult, Resource},
    models::{
        Page, Pagination,
        notification::{MarkedReadResponse, Notification, NotificationKind, UnreadCountResponse},
    },
    repositories::notification_repository,
};

/// Store a notification for `account_id`.
///
/// Runs on whatever executor it is given so callers can make it part of
/// their own transaction.
pub async fn notify<'e, E>(
    db: E,
    account_id: Uuid,
    kind: NotificationKind,
    title: &str,
    body: &str,
) -> AppResult<()>
where
    E: PgExecutor<'e>,
{
    let id = notification_repository::insert(db, account_id, kind, title, body).await?;
    tracing::debug!(%account_id, notification_id = %id, kind = kind.as_str(), "Notification stored");
    Ok(())
}

pub async fn list(
    pool: &DbPool,
    account_id: Uuid,
    unread_only: bool,
    pagination: Pagination,
) -> AppResult<Page<Notification>> {
    let items = notification_repository::list(
        pool,
        account_id,
        unread_only,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;
    let total = notification_repository::count(pool, account_id, unread_only).await?;
    Ok(Page::new(items, pagination, total))
}

pub async fn unread_count(pool: &DbPool, account_id: Uuid) -> AppResult<UnreadCountResponse> {
    let unread = notification_repository::count(pool, account_id, true).await?;
    Ok(UnreadCountResponse { unread })
}

pub async fn mark_read(pool: &DbPool, account_id: Uuid, notification_id: Uuid) -> AppResult<()> {
    if notification_repository::mark_read(pool, account_id, notification_id).await? == 0 {
        return Err(AppError::NotFound(Resource::Notification));
    }
    Ok(())
}

pub async fn mark_all_read(pool: &DbPool, account_id: Uuid) -> AppResult<MarkedReadResponse> {
    let updated = notification_repository::mark_all_read(pool, account_id).await?;
    Ok(MarkedReadResponse { updated })
}

pub async fn delete(pool: &DbPool, account_id: Uuid, notification_id: Uuid) -> AppResult<()> {
    if notification_repository::delete(pool, account_id, notification_id).await? == 0 {
        return Err(AppError::NotFound(Resource::Notification));
    }
    Ok(())
}
