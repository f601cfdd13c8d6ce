//! Queries over master and personal categories.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::category::{MasterCategory, PersonalCategory, SubCategory};

pub async fn list_master<'e, E>(
    db: E,
    transaction_type: Option<&str>,
) -> Result<Vec<MasterCategory>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, MasterCategory>(
        r#"
        SELECT id, transaction_type, name, icon
        FROM master_categories
        WHERE ($1::VARCHAR IS NULL OR transaction_type = $1)
        ORDER BY transaction_type, id
        "#,
    )
    .bind(transaction_type)
    .fetch_all(db)
    .await
}

pub async fn list_sub_categories<'e, E>(
    db: E,
    transaction_type: Option<&str>,
) -> Result<Vec<SubCategory>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, SubCategory>(
        r#"
        SELECT s.id, s.category_id, s.name, s.icon
        FROM master_sub_categories s
        JOIN master_categories c ON c.id = s.category_id
        WHERE ($1::VARCHAR IS NULL OR c.transaction_type = $1)
        ORDER BY s.category_id, s.id
        "#,
    )
    .bind(transaction_type)
    .fetch_all(db)
    .await
}

pub async fn find_master<'e, E>(db: E, id: i32) -> Result<Option<MasterCategory>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, MasterCategory>(
        "SELECT id, transaction_type, name, icon FROM master_categories WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn list_personal<'e, E>(
    db: E,
    account_id: Uuid,
    transaction_type: Option<&str>,
) -> Result<Vec<PersonalCategory>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, PersonalCategory>(
        r#"
        SELECT id, account_id, transaction_type, name, icon, created_at
        FROM personal_categories
        WHERE account_id = $1 AND ($2::VARCHAR IS NULL OR transaction_type = $2)
        ORDER BY transaction_type, name
        "#,
    )
    .bind(account_id)
    .bind(transaction_type)
    .fetch_all(db)
    .await
}

pub async fn find_personal<'e, E>(
    db: E,
    account_id: Uuid,
    id: Uuid,
) -> Result<Option<PersonalCategory>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, PersonalCategory>(
        r#"
        SELECT id, account_id, transaction_type, name, icon, created_at
        FROM personal_categories
        WHERE id = $1 AND account_id = $2
        "#,
    )
    .bind(id)
    .bind(account_id)
    .fetch_optional(db)
    .await
}

pub async fn insert_personal<'e, E>(
    db: E,
    account_id: Uuid,
    transaction_type: &str,
    name: &str,
    icon: Option<&str>,
) -> Result<PersonalCategory, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, PersonalCategory>(
        r#"
        INSERT INTO personal_categories (account_id, transaction_type, name, icon)
        VALUES ($1, $2, $3, $4)
        RETURNING id, account_id, transaction_type, name, icon, created_at
        "#,
    )
    .bind(account_id)
    .bind(transaction_type)
    .bind(name)
    .bind(icon)
    .fetch_one(db)
    .await
}

pub async fn update_personal<'e, E>(
    db: E,
    account_id: Uuid,
    id: Uuid,
    name: Option<&str>,
    icon: Option<&str>,
) -> Result<Option<PersonalCategory>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, PersonalCategory>(
        r#"
        UPDATE personal_categories
        SET name = COALESCE($3, name),
            icon = COALESCE($4, icon),
            updated_at = NOW()
        WHERE id = $1 AND account_id = $2
        RETURNING id, account_id, transaction_type, name, icon, created_at
        "#,
    )
    .bind(id)
    .bind(account_id)
    .bind(name)
    .bind(icon)
    .fetch_optional(db)
    .await
}

pub async fn delete_personal<'e, E>(db: E, account_id: Uuid, id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM personal_categories WHERE id = $1 AND account_id = $2")
        .bind(id)
        .bind(account_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
