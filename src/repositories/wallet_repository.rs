//! Queries over `wallets` and `wallet_balances`.
//!
//! Every lookup is scoped to the owning account and skips soft-deleted
//! wallets.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::wallet::{LockedWallet, Wallet};

pub async fn count_active<'e, E>(db: E, account_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM wallets WHERE account_id = $1 AND deleted_at IS NULL")
        .bind(account_id)
        .fetch_one(db)
        .await
}

/// Insert the wallet row and return its id. The caller must also insert
/// the balance row in the same transaction.
pub async fn insert_wallet<'e, E>(
    db: E,
    account_id: Uuid,
    wallet_type_id: i32,
    name: &str,
    currency: &str,
) -> Result<Uuid, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        INSERT INTO wallets (account_id, wallet_type_id, name, currency)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(account_id)
    .bind(wallet_type_id)
    .bind(name)
    .bind(currency)
    .fetch_one(db)
    .await
}

pub async fn insert_balance<'e, E>(db: E, wallet_id: Uuid, balance: i64) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("INSERT INTO wallet_balances (wallet_id, balance) VALUES ($1, $2)")
        .bind(wallet_id)
        .bind(balance)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn list<'e, E>(db: E, account_id: Uuid) -> Result<Vec<Wallet>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Wallet>(
        r#"
        SELECT w.id, w.account_id, w.wallet_type_id, t.code AS wallet_type_code,
               w.name, w.currency, b.balance, w.created_at, w.updated_at
        FROM wallets w
        JOIN master_wallet_types t ON t.id = w.wallet_type_id
        JOIN wallet_balances b ON b.wallet_id = w.id
        WHERE w.account_id = $1 AND w.deleted_at IS NULL
        ORDER BY w.created_at
        "#,
    )
    .bind(account_id)
    .fetch_all(db)
    .await
}

pub async fn find<'e, E>(db: E, account_id: Uuid, wallet_id: Uuid) -> Result<Option<Wallet>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Wallet>(
        r#"
        SELECT w.id, w.account_id, w.wallet_type_id, t.code AS wallet_type_code,
               w.name, w.currency, b.balance, w.created_at, w.updated_at
        FROM wallets w
        JOIN master_wallet_types t ON t.id = w.wallet_type_id
        JOIN wallet_balances b ON b.wallet_id = w.id
        WHERE w.id = $1 AND w.account_id = $2 AND w.deleted_at IS NULL
        "#,
    )
    .bind(wallet_id)
    .bind(account_id)
    .fetch_optional(db)
    .await
}

/// Lock the wallet's balance row for the rest of the transaction.
///
/// Callers locking several wallets must lock them in ascending id order
/// to avoid deadlocks.
pub async fn lock<'e, E>(db: E, account_id: Uuid, wallet_id: Uuid) -> Result<Option<LockedWallet>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, LockedWallet>(
        r#"
        SELECT w.id, t.code AS wallet_type_code, w.currency, b.balance
        FROM wallets w
        JOIN master_wallet_types t ON t.id = w.wallet_type_id
        JOIN wallet_balances b ON b.wallet_id = w.id
        WHERE w.id = $1 AND w.account_id = $2 AND w.deleted_at IS NULL
        FOR UPDATE OF b
        "#,
    )
    .bind(wallet_id)
    .bind(account_id)
    .fetch_optional(db)
    .await
}

/// Add `delta` (may be negative) to the balance and return the new value.
pub async fn adjust_balance<'e, E>(db: E, wallet_id: Uuid, delta: i64) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        UPDATE wallet_balances
        SET balance = balance + $2,
            updated_at = NOW()
        WHERE wallet_id = $1
        RETURNING balance
        "#,
    )
    .bind(wallet_id)
    .bind(delta)
    .fetch_one(db)
    .await
}

pub async fn rename<'e, E>(db: E, account_id: Uuid, wallet_id: Uuid, name: &str) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE wallets
        SET name = $3, updated_at = NOW()
        WHERE id = $1 AND account_id = $2 AND deleted_at IS NULL
        "#,
    )
    .bind(wallet_id)
    .bind(account_id)
    .bind(name)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn soft_delete<'e, E>(db: E, account_id: Uuid, wallet_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE wallets
        SET deleted_at = NOW(), updated_at = NOW()
        WHERE id = $1 AND account_id = $2 AND deleted_at IS NULL
        "#,
    )
    .bind(wallet_id)
    .bind(account_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

/// Sum of all active wallet balances of the account.
pub async fn total_balance<'e, E>(db: E, account_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(b.balance), 0)::BIGINT
        FROM wallets w
        JOIN wallet_balances b ON b.wallet_id = w.id
        WHERE w.account_id = $1 AND w.deleted_at IS NULL
        "#,
    )
    .bind(account_id)
    .fetch_one(db)
    .await
}
