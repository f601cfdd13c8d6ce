//! Aggregations over `transactions` for the statistics endpoints.
//!
//! Ranges are half-open: `[start, end)`.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::statistic::{CategoryTotalRow, MonthlyTotalRow, SummaryRow};

pub async fn summary<'e, E>(
    db: E,
    account_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<SummaryRow, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, SummaryRow>(
        r#"
        SELECT
            COALESCE(SUM(t.amount) FILTER (WHERE t.transaction_type = 'income'), 0)::BIGINT AS income,
            COALESCE(SUM(t.amount) FILTER (WHERE t.transaction_type = 'spending'), 0)::BIGINT AS spending,
            COALESCE(SUM(t.amount) FILTER (WHERE i.side = 'buy'), 0)::BIGINT AS investment_out,
            COALESCE(SUM(t.amount) FILTER (WHERE i.side = 'sell'), 0)::BIGINT AS investment_in,
            COUNT(*) AS transaction_count
        FROM transactions t
        LEFT JOIN investments i ON i.transaction_id = t.id
        WHERE t.account_id = $1
          AND t.transaction_at >= $2
          AND t.transaction_at < $3
        "#,
    )
    .bind(account_id)
    .bind(start)
    .bind(end)
    .fetch_one(db)
    .await
}

pub async fn category_totals<'e, E>(
    db: E,
    account_id: Uuid,
    transaction_type: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<CategoryTotalRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, CategoryTotalRow>(
        r#"
        SELECT t.category_id,
               t.personal_category_id,
               COALESCE(pc.name, c.name) AS category_name,
               SUM(t.amount)::BIGINT AS total
        FROM transactions t
        LEFT JOIN master_categories c ON c.id = t.category_id
        LEFT JOIN personal_categories pc ON pc.id = t.personal_category_id
        WHERE t.account_id = $1
          AND t.transaction_type = $2
          AND t.transaction_at >= $3
          AND t.transaction_at < $4
        GROUP BY t.category_id, t.personal_category_id, pc.name, c.name
        "#,
    )
    .bind(account_id)
    .bind(transaction_type)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
}

/// Income and spending per calendar month (UTC). Months without
/// transactions are absent.
pub async fn monthly_totals<'e, E>(
    db: E,
    account_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<MonthlyTotalRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, MonthlyTotalRow>(
        r#"
        SELECT DATE_TRUNC('month', t.transaction_at AT TIME ZONE 'UTC')::DATE AS month,
               COALESCE(SUM(t.amount) FILTER (WHERE t.transaction_type = 'income'), 0)::BIGINT AS income,
               COALESCE(SUM(t.amount) FILTER (WHERE t.transaction_type = 'spending'), 0)::BIGINT AS spending
        FROM transactions t
        WHERE t.account_id = $1
          AND t.transaction_at >= $2
          AND t.transaction_at < $3
        GROUP BY 1
        ORDER BY 1
        "#,
    )
    .bind(account_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
}
