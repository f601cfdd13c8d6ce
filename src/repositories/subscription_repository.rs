//! Queries over `subscriptions`.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::subscription::Subscription;

pub async fn insert<'e, E>(
    db: E,
    account_id: Uuid,
    plan_id: i32,
    payment_id: Uuid,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Result<Uuid, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        INSERT INTO subscriptions (account_id, plan_id, payment_id, starts_at, ends_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(account_id)
    .bind(plan_id)
    .bind(payment_id)
    .bind(starts_at)
    .bind(ends_at)
    .fetch_one(db)
    .await
}

/// Subscription periods of the account, latest first.
pub async fn list<'e, E>(db: E, account_id: Uuid) -> Result<Vec<Subscription>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Subscription>(
        r#"
        SELECT s.id, s.account_id, s.plan_id, p.name AS plan_name, s.payment_id,
               s.starts_at, s.ends_at, s.created_at
        FROM subscriptions s
        JOIN master_subscription_plans p ON p.id = s.plan_id
        WHERE s.account_id = $1
        ORDER BY s.starts_at DESC
        "#,
    )
    .bind(account_id)
    .fetch_all(db)
    .await
}
