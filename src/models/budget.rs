//! Monthly spending budgets per category.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Period;

/// Budget row joined with its category name and the amount spent so far in
/// the budget's month.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BudgetUsage {
    pub id: Uuid,
    pub account_id: Uuid,
    pub category_id: i32,
    pub category_name: String,
    pub period: NaiveDate,
    pub amount: i64,
    pub spent: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /api/v1/budgets`.
///
/// ```json
/// { "category_id": 4, "period": "2025-03", "amount": 2000000 }
/// ```
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateBudgetRequest {
    pub category_id: i32,
    pub period: Period,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBudgetRequest {
    pub amount: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    /// Every period when omitted
    #[serde(default)]
    pub period: Option<Period>,
}

#[derive(Debug, Serialize)]
pub struct BudgetResponse {
    pub id: Uuid,
    pub category_id: i32,
    pub category_name: String,
    pub period: Period,
    pub amount: i64,
    pub spent: i64,
    /// Negative once the budget is exceeded
    pub remaining: i64,
    pub usage_percent: f64,
    pub is_exceeded: bool,
}

impl From<BudgetUsage> for BudgetResponse {
    fn from(budget: BudgetUsage) -> Self {
        Self {
            id: budget.id,
            category_id: budget.category_id,
            category_name: budget.category_name,
            period: Period::from_first_day(budget.period),
            amount: budget.amount,
            spent: budget.spent,
            remaining: budget.amount - budget.spent,
            usage_percent: usage_percent(budget.spent, budget.amount),
            is_exceeded: budget.spent > budget.amount,
        }
    }
}

/// `spent / amount` as a percentage rounded to two decimals.
pub fn usage_percent(spent: i64, amount: i64) -> f64 {
    if amount <= 0 {
        return 0.0;
    }
    let percent = spent as f64 * 100.0 / amount as f64;
    (percent * 100.0).round() / 100.0
}

/// True when a spending of `added` moved `spent` from within the budget to
/// over it.
pub fn crossed_budget(amount: i64, spent_after: i64, added: i64) -> bool {
    spent_after > amount && spent_after - added <= amount
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_is_rounded() {
        assert_eq!(usage_percent(1, 3), 33.33);
        assert_eq!(usage_percent(150, 100), 150.0);
        assert_eq!(usage_percent(0, 100), 0.0);
        assert_eq!(usage_percent(10, 0), 0.0);
    }

    #[test]
    fn crossing_is_reported_once() {
        // 900 -> 1100 crosses a 1000 budget
        assert!(crossed_budget(1000, 1100, 200));
        // already over before this spending
        assert!(!crossed_budget(1000, 1300, 200));
        // still within budget
        assert!(!crossed_budget(1000, 1000, 200));
    }

    #[test]
    fn response_derives_remaining() {
        let usage = BudgetUsage {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            category_id: 4,
            category_name: "Food & Drink".to_string(),
            period: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            amount: 1000,
            spent: 1250,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response = BudgetResponse::from(usage);
        assert_eq!(response.remaining, -250);
        assert!(response.is_exceeded);
        assert_eq!(response.period.to_string(), "2025-03");
    }
}
