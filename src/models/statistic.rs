//! Aggregated statistics over transactions.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Period, budget::usage_percent, transaction::TransactionType};

pub const DEFAULT_TREND_MONTHS: u32 = 6;
pub const MAX_TREND_MONTHS: u32 = 24;

#[derive(Debug, Default, Deserialize)]
pub struct StatisticsQuery {
    #[serde(default)]
    pub period: Option<Period>,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendQuery {
    #[serde(default)]
    pub months: Option<u32>,
}

/// Totals for one month, straight from SQL.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct SummaryRow {
    pub income: i64,
    pub spending: i64,
    pub investment_out: i64,
    pub investment_in: i64,
    pub transaction_count: i64,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub period: Period,
    pub income: i64,
    pub spending: i64,
    /// Paid out of wallets for investment buys
    pub investment_out: i64,
    /// Paid back into wallets by investment sells
    pub investment_in: i64,
    /// `investment_out - investment_in`; negative when sells exceeded buys
    pub net_investment: i64,
    /// Income minus spending. Investment movements are not part of it.
    pub net: i64,
    pub transaction_count: i64,
    pub total_balance: i64,
}

impl SummaryResponse {
    pub fn new(period: Period, row: SummaryRow, total_balance: i64) -> Self {
        Self {
            period,
            income: row.income,
            spending: row.spending,
            investment_out: row.investment_out,
            investment_in: row.investment_in,
            net_investment: row.investment_out - row.investment_in,
            net: row.income - row.spending,
            transaction_count: row.transaction_count,
            total_balance,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryTotalRow {
    pub category_id: Option<i32>,
    pub personal_category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category_id: Option<i32>,
    pub personal_category_id: Option<Uuid>,
    pub category_name: String,
    pub total: i64,
    pub percentage: f64,
}

#[derive(Debug, Serialize)]
pub struct CategoryBreakdownResponse {
    pub period: Period,
    pub transaction_type: TransactionType,
    pub total: i64,
    pub categories: Vec<CategoryShare>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthlyTotalRow {
    pub month: NaiveDate,
    pub income: i64,
    pub spending: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: Period,
    pub income: i64,
    pub spending: i64,
    pub net: i64,
}

#[derive(Debug, Serialize)]
pub struct TrendResponse {
    pub months: Vec<TrendPoint>,
}

/// Share of each category in the total, largest first.
pub fn category_shares(rows: Vec<CategoryTotalRow>) -> (i64, Vec<CategoryShare>) {
    let total: i64 = rows.iter().map(|r| r.total).sum();
    let mut shares: Vec<CategoryShare> = rows
        .into_iter()
        .map(|row| CategoryShare {
            category_id: row.category_id,
            personal_category_id: row.personal_category_id,
            category_name: row
                .category_name
                .unwrap_or_else(|| "Uncategorized".to_string()),
            percentage: usage_percent(row.total, total),
            total: row.total,
        })
        .collect();
    shares.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category_name.cmp(&b.category_name)));
    (total, shares)
}

/// One point per month from `start` for `months` months; months without
/// rows are zero.
pub fn fill_trend(start: Period, months: u32, rows: Vec<MonthlyTotalRow>) -> Vec<TrendPoint> {
    let by_month: HashMap<Period, MonthlyTotalRow> = rows
        .into_iter()
        .map(|row| (Period::from_first_day(row.month), row))
        .collect();

    let mut points = Vec::with_capacity(months as usize);
    let mut period = start;
    for _ in 0..months {
        let (income, spending) = by_month
            .get(&period)
            .map_or((0, 0), |row| (row.income, row.spending));
        points.push(TrendPoint {
            period,
            income,
            spending,
            net: income - spending,
        });
        period = period.next();
    }
    points
}
