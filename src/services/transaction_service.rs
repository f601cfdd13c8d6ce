//! Transaction service - income, spending and transfers between wallets.
//!
//! This service handles:
//! - Balance checks against locked wallet rows
//! - Writing the transaction, its detail row and the balance changes
//!   atomically
//! - Reversing balances when a transaction is deleted
//!
//! # Atomicity Guarantees
//!
//! Every write happens inside one PostgreSQL transaction. Wallet balance
//! rows are locked with `FOR UPDATE` before they are checked, always in
//! ascending wallet id order so two transfers in opposite directions cannot
//! deadlock.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult, Resource},
    models::{
        Page,
        transaction::{
            CreateTransactionRequest, NewTransaction, NewTransactionDetail, TransactionFilter,
            TransactionRecord, TransactionType, TransferRequest, balance_effects,
        },
        wallet::LockedWallet,
    },
    repositories::{category_repository, transaction_repository, wallet_repository},
    services::budget_service,
    validation::Validator,
};

const MAX_DESCRIPTION_LEN: usize = 255;
const MAX_NOTE_LEN: usize = 1000;
const MAX_ATTACHMENT_URL_LEN: usize = 2048;

/// Record an income or spending transaction.
///
/// # Process
///
/// 1. Validate the request and its category
/// 2. Start database transaction and lock the wallet
/// 3. Check the balance covers a spending
/// 4. Insert transaction and detail, update the balance
/// 5. Commit, then check the category budget (spending only)
///
/// # Errors
///
/// - `Validation`: bad amount, type, category or text fields
/// - `NotFound(Wallet | Category)`: unknown or foreign wallet/category
/// - `InsufficientBalance`: spending exceeds the wallet balance
pub async fn create(
    pool: &DbPool,
    account_id: Uuid,
    request: CreateTransactionRequest,
) -> AppResult<TransactionRecord> {
    let description = non_blank(request.description);
    let note = non_blank(request.note);
    let attachment_url = non_blank(request.attachment_url);

    let mut validator = Validator::new();
    validator
        .amount("amount", request.amount)
        .check(
            request.transaction_type.is_categorized(),
            "invalid_transaction_type",
            "transaction_type must be income or spending; use the transfer or investment endpoints",
        )
        .check(
            request.category_id.is_none() || request.personal_category_id.is_none(),
            "ambiguous_category",
            "set either category_id or personal_category_id, not both",
        );
    check_text_fields(&mut validator, description.as_deref(), note.as_deref());
    if let Some(url) = attachment_url.as_deref() {
        validator.check(
            is_http_url(url) && url.len() <= MAX_ATTACHMENT_URL_LEN,
            "invalid_attachment_url",
            "attachment_url must be an http(s) URL",
        );
    }
    validator.finish()?;

    check_category(
        pool,
        account_id,
        request.transaction_type,
        request.category_id,
        request.personal_category_id,
    )
    .await?;

    let effects = balance_effects(request.transaction_type, request.wallet_id, None, request.amount)
        .ok_or_else(|| AppError::Internal("categorized transaction without balance effect".to_string()))?;

    let new = NewTransaction {
        account_id,
        wallet_id: request.wallet_id,
        transaction_type: request.transaction_type,
        category_id: request.category_id,
        personal_category_id: request.personal_category_id,
        amount: request.amount,
        description,
        transaction_at: request.transaction_at.unwrap_or_else(Utc::now),
    };
    let detail = NewTransactionDetail {
        note,
        attachment_url,
        ..Default::default()
    };

    let mut tx = pool.begin().await?;

    let locked = lock_in_order(&mut tx, account_id, &[request.wallet_id]).await?;
    check_balances(&locked, &effects)?;

    let transaction = transaction_repository::insert(&mut *tx, &new).await?;
    transaction_repository::insert_detail(&mut *tx, transaction.id, &detail).await?;
    apply_effects(&mut tx, &effects).await?;

    if let (TransactionType::Spending, Some(category_id)) = (new.transaction_type, new.category_id) {
        budget_service::notify_if_exceeded(&mut tx, account_id, category_id, new.transaction_at, new.amount)
            .await?;
    }

    let record = transaction_repository::find_record(&mut *tx, account_id, transaction.id)
        .await?
        .ok_or(AppError::NotFound(Resource::Transaction))?;

    tx.commit().await?;

    tracing::info!(
        %account_id,
        transaction_id = %record.id,
        transaction_type = %new.transaction_type,
        amount = new.amount,
        "Transaction recorded"
    );

    Ok(record)
}

/// Move money between two wallets of the same account.
///
/// Stored as one `transfer` transaction on the source wallet with the
/// destination in its detail row.
///
/// # Errors
///
/// - `Validation`: bad amount, same wallet twice, or different currencies
/// - `NotFound(Wallet)`: either wallet missing or foreign
/// - `InsufficientBalance`: source balance too low
pub async fn transfer(pool: &DbPool, account_id: Uuid, request: TransferRequest) -> AppResult<TransactionRecord> {
    let description = non_blank(request.description);
    let note = non_blank(request.note);

    let mut validator = Validator::new();
    validator.amount("amount", request.amount).check(
        request.from_wallet_id != request.to_wallet_id,
        "same_wallet",
        "from_wallet_id and to_wallet_id must differ",
    );
    check_text_fields(&mut validator, description.as_deref(), note.as_deref());
    validator.finish()?;

    let effects = balance_effects(
        TransactionType::Transfer,
        request.from_wallet_id,
        Some(request.to_wallet_id),
        request.amount,
    )
    .ok_or_else(|| AppError::Internal("transfer without destination".to_string()))?;

    let mut tx = pool.begin().await?;

    let locked = lock_in_order(
        &mut tx,
        account_id,
        &[request.from_wallet_id, request.to_wallet_id],
    )
    .await?;

    let same_currency = locked
        .get(&request.from_wallet_id)
        .zip(locked.get(&request.to_wallet_id))
        .is_some_and(|(from, to)| from.currency == to.currency);
    if !same_currency {
        return Err(AppError::invalid_field(
            "currency_mismatch",
            "both wallets must use the same currency",
        ));
    }
    check_balances(&locked, &effects)?;

    let new = NewTransaction {
        account_id,
        wallet_id: request.from_wallet_id,
        transaction_type: TransactionType::Transfer,
        category_id: None,
        personal_category_id: None,
        amount: request.amount,
        description,
        transaction_at: request.transaction_at.unwrap_or_else(Utc::now),
    };
    let detail = NewTransactionDetail {
        destination_wallet_id: Some(request.to_wallet_id),
        note,
        ..Default::default()
    };

    let transaction = transaction_repository::insert(&mut *tx, &new).await?;
    transaction_repository::insert_detail(&mut *tx, transaction.id, &detail).await?;
    apply_effects(&mut tx, &effects).await?;

    let record = transaction_repository::find_record(&mut *tx, account_id, transaction.id)
        .await?
        .ok_or(AppError::NotFound(Resource::Transaction))?;

    tx.commit().await?;

    tracing::info!(
        %account_id,
        transaction_id = %record.id,
        from = %request.from_wallet_id,
        to = %request.to_wallet_id,
        amount = request.amount,
        "Transfer completed"
    );

    Ok(record)
}

pub async fn list(pool: &DbPool, account_id: Uuid, filter: TransactionFilter) -> AppResult<Page<TransactionRecord>> {
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(AppError::invalid_field(
                "invalid_date_range",
                "from must not be after to",
            ));
        }
    }

    let pagination = filter.pagination();
    let items = transaction_repository::list_records(
        pool,
        account_id,
        &filter,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;
    let total = transaction_repository::count(pool, account_id, &filter).await?;

    Ok(Page::new(items, pagination, total))
}

pub async fn get(pool: &DbPool, account_id: Uuid, transaction_id: Uuid) -> AppResult<TransactionRecord> {
    transaction_repository::find_record(pool, account_id, transaction_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Transaction))
}

/// Delete a transaction and undo its balance changes.
///
/// Investment transactions are refused; they are tied to an investment
/// order and its holding.
///
/// # Errors
///
/// - `InsufficientBalance`: undoing an income or transfer would leave a
///   wallet negative
pub async fn delete(pool: &DbPool, account_id: Uuid, transaction_id: Uuid) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let record = transaction_repository::lock_record(&mut *tx, account_id, transaction_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Transaction))?;

    let transaction_type: TransactionType = record.transaction_type.parse().map_err(AppError::Internal)?;
    let Some(effects) = balance_effects(
        transaction_type,
        record.wallet_id,
        record.destination_wallet_id,
        record.amount,
    ) else {
        return Err(AppError::invalid_field(
            "investment_transaction",
            "investment transactions cannot be deleted",
        ));
    };
    let reversed: Vec<(Uuid, i64)> = effects.into_iter().map(|(wallet, delta)| (wallet, -delta)).collect();

    let wallet_ids: Vec<Uuid> = reversed.iter().map(|(wallet, _)| *wallet).collect();
    let locked = lock_in_order(&mut tx, account_id, &wallet_ids).await?;
    check_balances(&locked, &reversed)?;
    apply_effects(&mut tx, &reversed).await?;

    transaction_repository::delete(&mut *tx, account_id, transaction_id).await?;
    tx.commit().await?;

    tracing::info!(%account_id, %transaction_id, "Transaction deleted");
    Ok(())
}

/// Lock the balance rows of `wallet_ids` in ascending id order.
async fn lock_in_order(
    conn: &mut PgConnection,
    account_id: Uuid,
    wallet_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, LockedWallet>> {
    let mut ordered = wallet_ids.to_vec();
    ordered.sort_unstable();
    ordered.dedup();

    let mut locked = HashMap::with_capacity(ordered.len());
    for wallet_id in ordered {
        let wallet = wallet_repository::lock(&mut *conn, account_id, wallet_id)
            .await?
            .ok_or(AppError::NotFound(Resource::Wallet))?;
        locked.insert(wallet_id, wallet);
    }
    Ok(locked)
}

/// Fail with `InsufficientBalance` if any wallet would end up negative.
fn check_balances(locked: &HashMap<Uuid, LockedWallet>, effects: &[(Uuid, i64)]) -> AppResult<()> {
    let mut projected: HashMap<Uuid, i64> = locked.iter().map(|(id, w)| (*id, w.balance)).collect();

    for (wallet_id, delta) in effects {
        let balance = projected
            .get_mut(wallet_id)
            .ok_or(AppError::NotFound(Resource::Wallet))?;
        *balance = balance.checked_add(*delta).ok_or(AppError::InsufficientBalance)?;
        if *balance < 0 {
            return Err(AppError::InsufficientBalance);
        }
    }
    Ok(())
}

async fn apply_effects(conn: &mut PgConnection, effects: &[(Uuid, i64)]) -> AppResult<()> {
    for (wallet_id, delta) in effects {
        wallet_repository::adjust_balance(&mut *conn, *wallet_id, *delta).await?;
    }
    Ok(())
}

async fn check_category(
    pool: &DbPool,
    account_id: Uuid,
    transaction_type: TransactionType,
    category_id: Option<i32>,
    personal_category_id: Option<Uuid>,
) -> AppResult<()> {
    let category_type = if let Some(id) = category_id {
        let category = category_repository::find_master(pool, id)
            .await?
            .ok_or(AppError::NotFound(Resource::Category))?;
        Some(category.transaction_type)
    } else if let Some(id) = personal_category_id {
        let category = category_repository::find_personal(pool, account_id, id)
            .await?
            .ok_or(AppError::NotFound(Resource::Category))?;
        Some(category.transaction_type)
    } else {
        None
    };

    match category_type {
        Some(t) if t != transaction_type.as_str() => Err(AppError::invalid_field(
            "category_type_mismatch",
            format!("category belongs to {t}, not {transaction_type}"),
        )),
        _ => Ok(()),
    }
}

fn check_text_fields(validator: &mut Validator, description: Option<&str>, note: Option<&str>) {
    if let Some(description) = description {
        validator.text("description", description, MAX_DESCRIPTION_LEN);
    }
    if let Some(note) = note {
        validator.text("note", note, MAX_NOTE_LEN);
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked(balance: i64) -> (Uuid, LockedWallet) {
        let id = Uuid::new_v4();
        (
            id,
            LockedWallet {
                id,
                wallet_type_code: "cash".to_string(),
                currency: "IDR".to_string(),
                balance,
            },
        )
    }

    #[test]
    fn spending_within_balance_passes() {
        let (id, wallet) = locked(1_000);
        let wallets = HashMap::from([(id, wallet)]);
        assert!(check_balances(&wallets, &[(id, -1_000)]).is_ok());
        assert!(matches!(
            check_balances(&wallets, &[(id, -1_001)]),
            Err(AppError::InsufficientBalance)
        ));
    }

    #[test]
    fn transfer_checks_source_only_once() {
        let (from, from_wallet) = locked(500);
        let (to, to_wallet) = locked(0);
        let wallets = HashMap::from([(from, from_wallet), (to, to_wallet)]);

        assert!(check_balances(&wallets, &[(from, -500), (to, 500)]).is_ok());
        assert!(check_balances(&wallets, &[(from, -600), (to, 600)]).is_err());
    }

    #[test]
    fn reversing_income_needs_the_money_back() {
        let (id, wallet) = locked(300);
        let wallets = HashMap::from([(id, wallet)]);
        assert!(matches!(
            check_balances(&wallets, &[(id, -400)]),
            Err(AppError::InsufficientBalance)
        ));
    }

    #[test]
    fn unknown_wallet_in_effects() {
        let wallets = HashMap::new();
        assert!(matches!(
            check_balances(&wallets, &[(Uuid::new_v4(), 10)]),
            Err(AppError::NotFound(Resource::Wallet))
        ));
    }

    #[test]
    fn blank_text_is_dropped() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" lunch ".to_string())), Some("lunch".to_string()));
    }

    #[test]
    fn attachment_urls_must_be_http() {
        assert!(is_http_url("https://files.example.com/receipt.jpg"));
        assert!(!is_http_url("ftp://files.example.com/receipt.jpg"));
        assert!(!is_http_url("receipt.jpg"));
    }
}
