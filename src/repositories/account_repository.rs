//! Queries over `personal_accounts` and `authentications`.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::account::{AccountCredentials, PersonalAccount};

/// Whether an active account already uses `email` (case-insensitive).
pub async fn email_exists<'e, E>(db: E, email: &str) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM personal_accounts WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL)",
    )
    .bind(email)
    .fetch_one(db)
    .await
}

pub async fn insert_account<'e, E>(
    db: E,
    name: &str,
    email: &str,
    referral_code: &str,
) -> Result<PersonalAccount, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, PersonalAccount>(
        r#"
        INSERT INTO personal_accounts (name, email, referral_code)
        VALUES ($1, $2, $3)
        RETURNING id, name, email, phone, referral_code, subscription_expires_at, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(referral_code)
    .fetch_one(db)
    .await
}

pub async fn insert_authentication<'e, E>(
    db: E,
    account_id: Uuid,
    password_hash: &str,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("INSERT INTO authentications (account_id, password_hash) VALUES ($1, $2)")
        .bind(account_id)
        .bind(password_hash)
        .execute(db)
        .await?;
    Ok(())
}

/// True while the account exists and has not been soft-deleted.
pub async fn is_active<'e, E>(db: E, account_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM personal_accounts WHERE id = $1 AND deleted_at IS NULL)",
    )
    .bind(account_id)
    .fetch_one(db)
    .await
}

pub async fn find_by_id<'e, E>(db: E, account_id: Uuid) -> Result<Option<PersonalAccount>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, PersonalAccount>(
        r#"
        SELECT id, name, email, phone, referral_code, subscription_expires_at, created_at, updated_at
        FROM personal_accounts
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(account_id)
    .fetch_optional(db)
    .await
}

/// Same as [`find_by_id`] but locks the row until the transaction ends.
///
/// Serializes per-account checks such as the wallet count.
pub async fn lock_by_id<'e, E>(db: E, account_id: Uuid) -> Result<Option<PersonalAccount>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, PersonalAccount>(
        r#"
        SELECT id, name, email, phone, referral_code, subscription_expires_at, created_at, updated_at
        FROM personal_accounts
        WHERE id = $1 AND deleted_at IS NULL
        FOR UPDATE
        "#,
    )
    .bind(account_id)
    .fetch_optional(db)
    .await
}

pub async fn find_credentials_by_email<'e, E>(
    db: E,
    email: &str,
) -> Result<Option<AccountCredentials>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, AccountCredentials>(
        r#"
        SELECT a.id AS account_id, a.email, au.password_hash, a.subscription_expires_at
        FROM personal_accounts a
        JOIN authentications au ON au.account_id = a.id
        WHERE LOWER(a.email) = LOWER($1) AND a.deleted_at IS NULL
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await
}

pub async fn find_password_hash<'e, E>(db: E, account_id: Uuid) -> Result<Option<String>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        SELECT au.password_hash
        FROM authentications au
        JOIN personal_accounts a ON a.id = au.account_id
        WHERE au.account_id = $1 AND a.deleted_at IS NULL
        "#,
    )
    .bind(account_id)
    .fetch_optional(db)
    .await
}

pub async fn touch_last_sign_in<'e, E>(db: E, account_id: Uuid) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "UPDATE authentications SET last_sign_in_at = NOW(), updated_at = NOW() WHERE account_id = $1",
    )
    .bind(account_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Update the given profile fields, leaving `None` fields untouched.
pub async fn update_profile<'e, E>(
    db: E,
    account_id: Uuid,
    name: Option<&str>,
    phone: Option<&str>,
) -> Result<Option<PersonalAccount>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, PersonalAccount>(
        r#"
        UPDATE personal_accounts
        SET name = COALESCE($2, name),
            phone = COALESCE($3, phone),
            updated_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
        RETURNING id, name, email, phone, referral_code, subscription_expires_at, created_at, updated_at
        "#,
    )
    .bind(account_id)
    .bind(name)
    .bind(phone)
    .fetch_optional(db)
    .await
}

pub async fn update_password<'e, E>(db: E, account_id: Uuid, password_hash: &str) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "UPDATE authentications SET password_hash = $2, updated_at = NOW() WHERE account_id = $1",
    )
    .bind(account_id)
    .bind(password_hash)
    .execute(db)
    .await?;
    Ok(())
}

/// Returns the number of rows affected (0 when already deleted).
pub async fn soft_delete<'e, E>(db: E, account_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE personal_accounts SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(account_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn set_subscription_expiry<'e, E>(
    db: E,
    account_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "UPDATE personal_accounts SET subscription_expires_at = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(account_id)
    .bind(expires_at)
    .execute(db)
    .await?;
    Ok(())
}
