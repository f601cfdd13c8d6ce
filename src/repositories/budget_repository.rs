//! Queries over `budgets`, with spending computed on read.

use chrono::NaiveDate;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::budget::BudgetUsage;

/// Budget rows joined with their category and the spending recorded in
/// the budget's month.
const USAGE_SELECT: &str = r#"
    SELECT b.id, b.account_id, b.category_id, c.name AS category_name, b.period, b.amount,
           COALESCE((
               SELECT SUM(t.amount)
               FROM transactions t
               WHERE t.account_id = b.account_id
                 AND t.category_id = b.category_id
                 AND t.transaction_type = 'spending'
                 AND t.transaction_at >= b.period
                 AND t.transaction_at < (b.period + INTERVAL '1 month')
           ), 0)::BIGINT AS spent,
           b.created_at, b.updated_at
    FROM budgets b
    JOIN master_categories c ON c.id = b.category_id
"#;

pub async fn insert<'e, E>(
    db: E,
    account_id: Uuid,
    category_id: i32,
    period: NaiveDate,
    amount: i64,
) -> Result<Uuid, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        INSERT INTO budgets (account_id, category_id, period, amount)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(account_id)
    .bind(category_id)
    .bind(period)
    .bind(amount)
    .fetch_one(db)
    .await
}

pub async fn find_usage<'e, E>(db: E, account_id: Uuid, budget_id: Uuid) -> Result<Option<BudgetUsage>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{USAGE_SELECT} WHERE b.id = $1 AND b.account_id = $2");
    sqlx::query_as::<_, BudgetUsage>(&sql)
        .bind(budget_id)
        .bind(account_id)
        .fetch_optional(db)
        .await
}

pub async fn list_usage<'e, E>(
    db: E,
    account_id: Uuid,
    period: Option<NaiveDate>,
) -> Result<Vec<BudgetUsage>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "{USAGE_SELECT} WHERE b.account_id = $1 AND ($2::DATE IS NULL OR b.period = $2) ORDER BY b.period DESC, c.name"
    );
    sqlx::query_as::<_, BudgetUsage>(&sql)
        .bind(account_id)
        .bind(period)
        .fetch_all(db)
        .await
}

/// Budget covering `category_id` in the month starting at `period`, if any.
pub async fn find_for_category<'e, E>(
    db: E,
    account_id: Uuid,
    category_id: i32,
    period: NaiveDate,
) -> Result<Option<BudgetUsage>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{USAGE_SELECT} WHERE b.account_id = $1 AND b.category_id = $2 AND b.period = $3");
    sqlx::query_as::<_, BudgetUsage>(&sql)
        .bind(account_id)
        .bind(category_id)
        .bind(period)
        .fetch_optional(db)
        .await
}

/// Lock the budget row for one category and month until the surrounding
/// transaction ends. Returns `false` when no budget exists.
pub async fn lock_for_category<'e, E>(
    db: E,
    account_id: Uuid,
    category_id: i32,
    period: NaiveDate,
) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let locked = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM budgets WHERE account_id = $1 AND category_id = $2 AND period = $3 FOR UPDATE",
    )
    .bind(account_id)
    .bind(category_id)
    .bind(period)
    .fetch_optional(db)
    .await?;
    Ok(locked.is_some())
}

pub async fn update_amount<'e, E>(db: E, account_id: Uuid, budget_id: Uuid, amount: i64) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE budgets SET amount = $3, updated_at = NOW() WHERE id = $1 AND account_id = $2",
    )
    .bind(budget_id)
    .bind(account_id)
    .bind(amount)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete<'e, E>(db: E, account_id: Uuid, budget_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM budgets WHERE id = $1 AND account_id = $2")
        .bind(budget_id)
        .bind(account_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
