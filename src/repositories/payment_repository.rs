//! Queries over `payments`.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::payment::{Payment, PaymentStatus};

/// A payment as created after the gateway accepted the order.
#[derive(Debug, Clone)]
pub struct NewPayment<'a> {
    pub account_id: Uuid,
    pub plan_id: i32,
    pub order_id: &'a str,
    pub gross_amount: i64,
    pub snap_token: &'a str,
    pub redirect_url: &'a str,
    pub gateway_response: &'a serde_json::Value,
}

pub async fn insert<'e, E>(db: E, new: &NewPayment<'_>) -> Result<Payment, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (
            account_id,
            plan_id,
            order_id,
            gross_amount,
            status,
            snap_token,
            redirect_url,
            gateway_response
        )
        VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(new.account_id)
    .bind(new.plan_id)
    .bind(new.order_id)
    .bind(new.gross_amount)
    .bind(new.snap_token)
    .bind(new.redirect_url)
    .bind(new.gateway_response)
    .fetch_one(db)
    .await
}

/// Lock a payment by order id, regardless of owner. Used by the gateway
/// notification, which carries no account.
pub async fn lock_by_order_id<'e, E>(db: E, order_id: &str) -> Result<Option<Payment>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(db)
        .await
}

pub async fn find_for_account<'e, E>(db: E, account_id: Uuid, order_id: &str) -> Result<Option<Payment>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = $1 AND account_id = $2")
        .bind(order_id)
        .bind(account_id)
        .fetch_optional(db)
        .await
}

pub async fn list<'e, E>(db: E, account_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Payment>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Payment>(
        r#"
        SELECT * FROM payments
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
    sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE account_id = $1")
        .bind(account_id)
        .fetch_one(db)
        .await
}

pub async fn update_status<'e, E>(
    db: E,
    payment_id: Uuid,
    status: PaymentStatus,
    payment_type: Option<&str>,
    gateway_response: &serde_json::Value,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE payments
        SET status = $2,
            payment_type = COALESCE($3, payment_type),
            gateway_response = $4,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(payment_id)
    .bind(status.as_str())
    .bind(payment_type)
    .bind(gateway_response)
    .execute(db)
    .await?;
    Ok(())
}
