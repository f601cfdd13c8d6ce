//! Queries over `investments`.

use rust_decimal::Decimal;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::investment::{Investment, InvestmentSide};

/// Orders joined with their item lookup.
const INVESTMENT_SELECT: &str = r#"
    SELECT i.id, i.account_id, i.wallet_id, i.investment_item_id,
           m.name AS item_name, m.unit AS item_unit, i.transaction_id,
           i.side, i.quantity, i.price_per_unit, i.amount, i.created_at
    FROM investments i
    JOIN master_investment_items m ON m.id = i.investment_item_id
"#;

/// Everything needed to record one buy or sell order.
#[derive(Debug, Clone)]
pub struct NewInvestment {
    pub account_id: Uuid,
    pub wallet_id: Uuid,
    pub investment_item_id: i32,
    pub transaction_id: Uuid,
    pub side: InvestmentSide,
    pub quantity: Decimal,
    pub price_per_unit: i64,
    pub amount: i64,
}

pub async fn insert<'e, E>(db: E, new: &NewInvestment) -> Result<Uuid, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        INSERT INTO investments (
            account_id,
            wallet_id,
            investment_item_id,
            transaction_id,
            side,
            quantity,
            price_per_unit,
            amount
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(new.account_id)
    .bind(new.wallet_id)
    .bind(new.investment_item_id)
    .bind(new.transaction_id)
    .bind(new.side.as_str())
    .bind(new.quantity)
    .bind(new.price_per_unit)
    .bind(new.amount)
    .fetch_one(db)
    .await
}

/// Quantity of `investment_item_id` currently held (buys minus sells).
pub async fn held_quantity<'e, E>(db: E, account_id: Uuid, investment_item_id: i32) -> Result<Decimal, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(CASE WHEN side = 'buy' THEN quantity ELSE -quantity END), 0)
        FROM investments
        WHERE account_id = $1 AND investment_item_id = $2
        "#,
    )
    .bind(account_id)
    .bind(investment_item_id)
    .fetch_one(db)
    .await
}

pub async fn find<'e, E>(db: E, account_id: Uuid, investment_id: Uuid) -> Result<Option<Investment>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{INVESTMENT_SELECT} WHERE i.id = $1 AND i.account_id = $2");
    sqlx::query_as::<_, Investment>(&sql)
        .bind(investment_id)
        .bind(account_id)
        .fetch_optional(db)
        .await
}

/// Page of orders, newest first.
pub async fn list<'e, E>(
    db: E,
    account_id: Uuid,
    investment_item_id: Option<i32>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Investment>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "{INVESTMENT_SELECT} WHERE i.account_id = $1 AND ($2::INT IS NULL OR i.investment_item_id = $2) \
         ORDER BY i.created_at DESC, i.id LIMIT $3 OFFSET $4"
    );
    sqlx::query_as::<_, Investment>(&sql)
        .bind(account_id)
        .bind(investment_item_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

pub async fn count<'e, E>(db: E, account_id: Uuid, investment_item_id: Option<i32>) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM investments WHERE account_id = $1 AND ($2::INT IS NULL OR investment_item_id = $2)",
    )
    .bind(account_id)
    .bind(investment_item_id)
    .fetch_one(db)
    .await
}

/// Full order history, oldest first, for portfolio computation.
pub async fn list_chronological<'e, E>(db: E, account_id: Uuid) -> Result<Vec<Investment>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{INVESTMENT_SELECT} WHERE i.account_id = $1 ORDER BY i.created_at, i.id");
    sqlx::query_as::<_, Investment>(&sql)
        .bind(account_id)
        .fetch_all(db)
        .await
}
