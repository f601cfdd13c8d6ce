//! Queries over `tracks`.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::track::{ClientInfo, Track};

pub async fn insert<'e, E>(db: E, account_id: Uuid, client: &ClientInfo) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("INSERT INTO tracks (account_id, ip_address, user_agent) VALUES ($1, $2, $3)")
        .bind(account_id)
        .bind(client.ip_address.as_deref())
        .bind(client.user_agent.as_deref())
        .execute(db)
        .await?;
    Ok(())
}

pub async fn list<'e, E>(db: E, account_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Track>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Track>(
        r#"
        SELECT id, account_id, ip_address, user_agent, created_at
        FROM tracks
        WHERE account_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(account_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn count<'e, E>(db: E, account_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM tracks WHERE account_id = $1")
        .bind(account_id)
        .fetch_one(db)
        .await
}
