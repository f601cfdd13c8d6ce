//! Queries over the `rewards` referral tree.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::referral::{ReferralTreeRow, Reward};

pub async fn insert_reward<'e, E>(
    db: E,
    account_id: Uuid,
    referral_code: &str,
    referred_by: Option<&str>,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("INSERT INTO rewards (account_id, referral_code, referred_by) VALUES ($1, $2, $3)")
        .bind(account_id)
        .bind(referral_code)
        .bind(referred_by)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn code_exists<'e, E>(db: E, referral_code: &str) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rewards WHERE referral_code = $1)")
        .bind(referral_code)
        .fetch_one(db)
        .await
}

/// Reward row of an active account owning `referral_code`.
pub async fn find_by_code<'e, E>(db: E, referral_code: &str) -> Result<Option<Reward>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Reward>(
        r#"
        SELECT r.account_id, r.referral_code, r.referred_by
        FROM rewards r
        JOIN personal_accounts a ON a.id = r.account_id
        WHERE r.referral_code = $1 AND a.deleted_at IS NULL
        "#,
    )
    .bind(referral_code)
    .fetch_optional(db)
    .await
}

pub async fn find_by_account<'e, E>(db: E, account_id: Uuid) -> Result<Option<Reward>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Reward>(
        "SELECT account_id, referral_code, referred_by FROM rewards WHERE account_id = $1",
    )
    .bind(account_id)
    .fetch_optional(db)
    .await
}

pub async fn lock_by_account<'e, E>(db: E, account_id: Uuid) -> Result<Option<Reward>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Reward>(
        "SELECT account_id, referral_code, referred_by FROM rewards WHERE account_id = $1 FOR UPDATE",
    )
    .bind(account_id)
    .fetch_optional(db)
    .await
}

pub async fn count_direct<'e, E>(db: E, referral_code: &str) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM rewards r
        JOIN personal_accounts a ON a.id = r.account_id
        WHERE r.referred_by = $1 AND a.deleted_at IS NULL
        "#,
    )
    .bind(referral_code)
    .fetch_one(db)
    .await
}

/// Whether `candidate_code` sits anywhere below `root_code` in the tree.
pub async fn is_in_downline<'e, E>(db: E, root_code: &str, candidate_code: &str) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        WITH RECURSIVE downline AS (
            SELECT referral_code FROM rewards WHERE referred_by = $1
            UNION
            SELECT r.referral_code
            FROM rewards r
            JOIN downline d ON r.referred_by = d.referral_code
        )
        SELECT EXISTS(SELECT 1 FROM downline WHERE referral_code = $2)
        "#,
    )
    .bind(root_code)
    .bind(candidate_code)
    .fetch_one(db)
    .await
}

/// Serialize changes to the referral tree until the transaction ends.
///
/// Two accounts applying each other's codes at the same time would each
/// pass the cycle check on their own; holding this lock makes the second
/// one see the first one's link.
pub async fn lock_tree<'e, E>(db: E) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext('rewards_tree'))")
        .execute(db)
        .await?;
    Ok(())
}

/// Attach a referrer. Returns 0 when a referrer was already set.
pub async fn set_referred_by<'e, E>(db: E, account_id: Uuid, referred_by: &str) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE rewards SET referred_by = $2 WHERE account_id = $1 AND referred_by IS NULL",
    )
    .bind(account_id)
    .bind(referred_by)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

/// Walk the tree below `referral_code` down to `max_depth` levels.
///
/// Each member comes with its tier level and the sum of its settled
/// payments. Deleted accounts are left out but their own referrals are
/// still reached through them.
pub async fn downline<'e, E>(db: E, referral_code: &str, max_depth: i32) -> Result<Vec<ReferralTreeRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ReferralTreeRow>(
        r#"
        WITH RECURSIVE tree AS (
            SELECT r.account_id, r.referral_code, 1 AS level
            FROM rewards r
            WHERE r.referred_by = $1
            UNION ALL
            SELECT r.account_id, r.referral_code, tree.level + 1
            FROM rewards r
            JOIN tree ON r.referred_by = tree.referral_code
            WHERE tree.level < $2
        )
        SELECT tree.level,
               a.id AS account_id,
               a.name,
               a.subscription_expires_at,
               COALESCE((
                   SELECT SUM(p.gross_amount)
                   FROM payments p
                   WHERE p.account_id = a.id AND p.status = 'settlement'
               ), 0)::BIGINT AS paid_amount
        FROM tree
        JOIN personal_accounts a ON a.id = tree.account_id
        WHERE a.deleted_at IS NULL
        ORDER BY tree.level, a.name
        "#,
    )
    .bind(referral_code)
    .bind(max_depth)
    .fetch_all(db)
    .await
}
