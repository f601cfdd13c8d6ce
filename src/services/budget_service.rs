//! Monthly spending budgets per master category.
//!
//! Spending is not stored on the budget; it is summed from the account's
//! spending transactions in the budget's month whenever a budget is read.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult, Resource, is_unique_violation},
    models::{
        Period,
        budget::{BudgetQuery, BudgetResponse, CreateBudgetRequest, UpdateBudgetRequest, crossed_budget},
        notification::NotificationKind,
        transaction::TransactionType,
    },
    repositories::{budget_repository, category_repository},
    services::notification_service,
    validation::Validator,
};

/// Create a budget for one spending category and month.
///
/// # Errors
///
/// - `Validation`: bad amount, or the category is not a spending category
/// - `NotFound(Category)`: unknown category
/// - `BudgetAlreadyExists`: same category and month already budgeted
pub async fn create(pool: &DbPool, account_id: Uuid, request: CreateBudgetRequest) -> AppResult<BudgetResponse> {
    Validator::new().amount("amount", request.amount).finish()?;

    let category = category_repository::find_master(pool, request.category_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Category))?;
    if category.transaction_type != TransactionType::Spending.as_str() {
        return Err(AppError::invalid_field(
            "invalid_category",
            "budgets can only track spending categories",
        ));
    }

    let budget_id = budget_repository::insert(
        pool,
        account_id,
        request.category_id,
        request.period.first_day(),
        request.amount,
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::BudgetAlreadyExists
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::info!(%account_id, %budget_id, period = %request.period, "Budget created");
    get(pool, account_id, budget_id).await
}

pub async fn list(pool: &DbPool, account_id: Uuid, query: BudgetQuery) -> AppResult<Vec<BudgetResponse>> {
    let budgets =
        budget_repository::list_usage(pool, account_id, query.period.map(Period::first_day)).await?;
    Ok(budgets.into_iter().map(Into::into).collect())
}

pub async fn get(pool: &DbPool, account_id: Uuid, budget_id: Uuid) -> AppResult<BudgetResponse> {
    budget_repository::find_usage(pool, account_id, budget_id)
        .await?
        .map(Into::into)
        .ok_or(AppError::NotFound(Resource::Budget))
}

pub async fn update(
    pool: &DbPool,
    account_id: Uuid,
    budget_id: Uuid,
    request: UpdateBudgetRequest,
) -> AppResult<BudgetResponse> {
    Validator::new().amount("amount", request.amount).finish()?;

    if budget_repository::update_amount(pool, account_id, budget_id, request.amount).await? == 0 {
        return Err(AppError::NotFound(Resource::Budget));
    }
    get(pool, account_id, budget_id).await
}

pub async fn delete(pool: &DbPool, account_id: Uuid, budget_id: Uuid) -> AppResult<()> {
    if budget_repository::delete(pool, account_id, budget_id).await? == 0 {
        return Err(AppError::NotFound(Resource::Budget));
    }
    Ok(())
}

/// Store a budget-exceeded notification when a spending of `amount`, already
/// inserted on `conn`, pushed the category over its budget for that month.
///
/// Must run inside the transaction that inserted the spending. The budget
/// row is locked first so concurrent spendings on the same category are
/// evaluated one after the other, and only the one that crosses the limit
/// notifies.
pub async fn notify_if_exceeded(
    conn: &mut PgConnection,
    account_id: Uuid,
    category_id: i32,
    transaction_at: DateTime<Utc>,
    amount: i64,
) -> AppResult<()> {
    let period = Period::containing(transaction_at);
    if !budget_repository::lock_for_category(&mut *conn, account_id, category_id, period.first_day()).await? {
        return Ok(());
    }
    let Some(budget) =
        budget_repository::find_for_category(&mut *conn, account_id, category_id, period.first_day()).await?
    else {
        return Ok(());
    };

    if !crossed_budget(budget.amount, budget.spent, amount) {
        return Ok(());
    }

    let body = format!(
        "Spending on {} reached {} of the {} budgeted for {}.",
        budget.category_name, budget.spent, budget.amount, period
    );
    notification_service::notify(&mut *conn, account_id, NotificationKind::BudgetExceeded, "Budget exceeded", &body)
        .await?;

    tracing::info!(%account_id, budget_id = %budget.id, "Budget exceeded");
    Ok(())
}
