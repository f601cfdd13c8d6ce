//! Queries over `notifications`.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::notification::{Notification, NotificationKind};

pub async fn insert<'e, E>(
    db: E,
    account_id: Uuid,
    kind: NotificationKind,
    title: &str,
    body: &str,
) -> Result<Uuid, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        INSERT INTO notifications (account_id, kind, title, body)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(account_id)
    .bind(kind.as_str())
    .bind(title)
    .bind(body)
    .fetch_one(db)
    .await
}

pub async fn list<'e, E>(
    db: E,
    account_id: Uuid,
    unread_only: bool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Notification>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, account_id, kind, title, body, is_read, created_at
        FROM notifications
        WHERE account_id = $1 AND (NOT $2 OR is_read = false)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(account_id)
    .bind(unread_only)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn count<'e, E>(db: E, account_id: Uuid, unread_only: bool) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE account_id = $1 AND (NOT $2 OR is_read = false)",
    )
    .bind(account_id)
    .bind(unread_only)
    .fetch_one(db)
    .await
}

pub async fn mark_read<'e, E>(db: E, account_id: Uuid, notification_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1 AND account_id = $2")
        .bind(notification_id)
        .bind(account_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn mark_all_read<'e, E>(db: E, account_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE notifications SET is_read = true WHERE account_id = $1 AND is_read = false",
    )
    .bind(account_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete<'e, E>(db: E, account_id: Uuid, notification_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND account_id = $2")
        .bind(notification_id)
        .bind(account_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
