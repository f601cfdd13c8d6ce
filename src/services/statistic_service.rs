//! Monthly statistics over the account's transactions.

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::{
        Period,
        statistic::{
            CategoryBreakdownResponse, DEFAULT_TREND_MONTHS, MAX_TREND_MONTHS, StatisticsQuery,
            SummaryResponse, TrendQuery, TrendResponse, category_shares, fill_trend,
        },
        transaction::TransactionType,
    },
    repositories::{statistic_repository, wallet_repository},
};

/// Totals for one month (default: the current one) plus the current
/// balance across all wallets.
pub async fn summary(pool: &DbPool, account_id: Uuid, query: StatisticsQuery) -> AppResult<SummaryResponse> {
    let period = query.period.unwrap_or_else(Period::current);

    let row = statistic_repository::summary(pool, account_id, period.start(), period.end()).await?;
    let total_balance = wallet_repository::total_balance(pool, account_id).await?;

    Ok(SummaryResponse::new(period, row, total_balance))
}

/// Per-category totals of one month for income or spending (default).
pub async fn categories(
    pool: &DbPool,
    account_id: Uuid,
    query: StatisticsQuery,
) -> AppResult<CategoryBreakdownResponse> {
    let period = query.period.unwrap_or_else(Period::current);
    let transaction_type = query.transaction_type.unwrap_or(TransactionType::Spending);
    if !transaction_type.is_categorized() {
        return Err(AppError::invalid_field(
            "invalid_transaction_type",
            "category statistics are available for income and spending only",
        ));
    }

    let rows = statistic_repository::category_totals(
        pool,
        account_id,
        transaction_type.as_str(),
        period.start(),
        period.end(),
    )
    .await?;
    let (total, categories) = category_shares(rows);

    Ok(CategoryBreakdownResponse {
        period,
        transaction_type,
        total,
        categories,
    })
}

/// Income and spending for the last `months` months, current month last.
pub async fn trend(pool: &DbPool, account_id: Uuid, query: TrendQuery) -> AppResult<TrendResponse> {
    let months = trend_months(query.months)?;
    let current = Period::current();
    let start = current.minus_months(months - 1);

    let rows = statistic_repository::monthly_totals(pool, account_id, start.start(), current.end()).await?;

    Ok(TrendResponse {
        months: fill_trend(start, months, rows),
    })
}

fn trend_months(requested: Option<u32>) -> AppResult<u32> {
    let months = requested.unwrap_or(DEFAULT_TREND_MONTHS);
    if !(1..=MAX_TREND_MONTHS).contains(&months) {
        return Err(AppError::invalid_field(
            "invalid_months",
            format!("months must be between 1 and {MAX_TREND_MONTHS}"),
        ));
    }
    Ok(months)
}
