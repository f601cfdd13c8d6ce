//! Queries over `transactions` and `transaction_details`.

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::transaction::{
    NewTransaction, NewTransactionDetail, Transaction, TransactionFilter, TransactionRecord,
};

const RECORD_SELECT: &str = r#"
    SELECT t.id, t.account_id, t.wallet_id, t.transaction_type, t.category_id,
           t.personal_category_id, COALESCE(pc.name, c.name) AS category_name,
           t.amount, t.description, t.transaction_at, t.created_at,
           d.destination_wallet_id, d.investment_item_id, d.quantity,
           d.price_per_unit, d.note, d.attachment_url
    FROM transactions t
    LEFT JOIN transaction_details d ON d.transaction_id = t.id
    LEFT JOIN master_categories c ON c.id = t.category_id
    LEFT JOIN personal_categories pc ON pc.id = t.personal_category_id
"#;

const FILTER_WHERE: &str = r#"
    WHERE t.account_id = $1
      AND ($2::UUID IS NULL OR t.wallet_id = $2 OR d.destination_wallet_id = $2)
      AND ($3::VARCHAR IS NULL OR t.transaction_type = $3)
      AND ($4::DATE IS NULL OR t.transaction_at >= $4::DATE)
      AND ($5::DATE IS NULL OR t.transaction_at < $5::DATE + 1)
"#;

pub async fn insert<'e, E>(db: E, new: &NewTransaction) -> Result<Transaction, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            account_id,
            wallet_id,
            transaction_type,
            category_id,
            personal_category_id,
            amount,
            description,
            transaction_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, account_id, wallet_id, transaction_type, category_id,
                  personal_category_id, amount, description, transaction_at, created_at
        "#,
    )
    .bind(new.account_id)
    .bind(new.wallet_id)
    .bind(new.transaction_type.as_str())
    .bind(new.category_id)
    .bind(new.personal_category_id)
    .bind(new.amount)
    .bind(new.description.as_deref())
    .bind(new.transaction_at)
    .fetch_one(db)
    .await
}

pub async fn insert_detail<'e, E>(
    db: E,
    transaction_id: Uuid,
    detail: &NewTransactionDetail,
) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO transaction_details (
            transaction_id,
            destination_wallet_id,
            investment_item_id,
            quantity,
            price_per_unit,
            note,
            attachment_url
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(transaction_id)
    .bind(detail.destination_wallet_id)
    .bind(detail.investment_item_id)
    .bind(detail.quantity)
    .bind(detail.price_per_unit)
    .bind(detail.note.as_deref())
    .bind(detail.attachment_url.as_deref())
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_record<'e, E>(
    db: E,
    account_id: Uuid,
    transaction_id: Uuid,
) -> Result<Option<TransactionRecord>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{RECORD_SELECT} WHERE t.id = $1 AND t.account_id = $2");
    sqlx::query_as::<_, TransactionRecord>(&sql)
        .bind(transaction_id)
        .bind(account_id)
        .fetch_optional(db)
        .await
}

/// Same as [`find_record`] but locks the transaction row.
pub async fn lock_record<'e, E>(
    db: E,
    account_id: Uuid,
    transaction_id: Uuid,
) -> Result<Option<TransactionRecord>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{RECORD_SELECT} WHERE t.id = $1 AND t.account_id = $2 FOR UPDATE OF t");
    sqlx::query_as::<_, TransactionRecord>(&sql)
        .bind(transaction_id)
        .bind(account_id)
        .fetch_optional(db)
        .await
}

/// Page of transactions matching `filter`, newest first.
pub async fn list_records<'e, E>(
    db: E,
    account_id: Uuid,
    filter: &TransactionFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<TransactionRecord>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "{RECORD_SELECT} {FILTER_WHERE} ORDER BY t.transaction_at DESC, t.created_at DESC LIMIT $6 OFFSET $7"
    );
    sqlx::query_as::<_, TransactionRecord>(&sql)
        .bind(account_id)
        .bind(filter.wallet_id)
        .bind(filter.transaction_type.map(|t| t.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

pub async fn count<'e, E>(db: E, account_id: Uuid, filter: &TransactionFilter) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT COUNT(*) FROM transactions t LEFT JOIN transaction_details d ON d.transaction_id = t.id {FILTER_WHERE}"
    );
    sqlx::query_scalar(&sql)
        .bind(account_id)
        .bind(filter.wallet_id)
        .bind(filter.transaction_type.map(|t| t.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .fetch_one(db)
        .await
}

/// Deletes the transaction; its detail row goes with it (`ON DELETE CASCADE`).
pub async fn delete<'e, E>(db: E, account_id: Uuid, transaction_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND account_id = $2")
        .bind(transaction_id)
        .bind(account_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
