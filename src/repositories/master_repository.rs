//! Queries over the `master_*` lookup tables.

use sqlx::PgExecutor;

use crate::models::master::{InvestmentItem, MasterItem, MasterKind, WalletType};
use crate::models::subscription::SubscriptionPlan;

/// List a lookup table. The table name comes from the closed
/// [`MasterKind`] enum, never from user input.
pub async fn list<'e, E>(db: E, kind: MasterKind) -> Result<Vec<MasterItem>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let unit = match kind {
        MasterKind::InvestmentItems => "unit",
        MasterKind::WalletTypes | MasterKind::TransactionTypes => "NULL::VARCHAR",
    };
    let sql = format!(
        "SELECT id, code, name, {unit} AS unit FROM {} ORDER BY id",
        kind.table()
    );
    sqlx::query_as::<_, MasterItem>(&sql).fetch_all(db).await
}

pub async fn find_wallet_type<'e, E>(db: E, id: i32) -> Result<Option<WalletType>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, WalletType>("SELECT id, code, name FROM master_wallet_types WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_investment_item<'e, E>(db: E, id: i32) -> Result<Option<InvestmentItem>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, InvestmentItem>(
        "SELECT id, code, name, unit FROM master_investment_items WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list_plans<'e, E>(db: E) -> Result<Vec<SubscriptionPlan>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, SubscriptionPlan>(
        r#"
        SELECT id, code, name, price, duration_months, is_active
        FROM master_subscription_plans
        WHERE is_active = true
        ORDER BY price
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn find_active_plan<'e, E>(db: E, id: i32) -> Result<Option<SubscriptionPlan>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, SubscriptionPlan>(
        r#"
        SELECT id, code, name, price, duration_months, is_active
        FROM master_subscription_plans
        WHERE id = $1 AND is_active = true
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_plan<'e, E>(db: E, id: i32) -> Result<Option<SubscriptionPlan>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, SubscriptionPlan>(
        "SELECT id, code, name, price, duration_months, is_active FROM master_subscription_plans WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}
