//! Transaction data models and API request/response types.
//!
//! This module defines:
//! - `TransactionType`: income, spending, transfer or investment
//! - `TransactionRecord`: a transaction joined with its detail row
//! - Request types for recording, transferring and listing
//! - `balance_effects`: how a transaction moves wallet balances

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Pagination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Spending,
    Transfer,
    Investment,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Spending => "spending",
            TransactionType::Transfer => "transfer",
            TransactionType::Investment => "investment",
        }
    }

    /// Types a category can be attached to.
    pub fn is_categorized(self) -> bool {
        matches!(self, TransactionType::Income | TransactionType::Spending)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "spending" => Ok(TransactionType::Spending),
            "transfer" => Ok(TransactionType::Transfer),
            "investment" => Ok(TransactionType::Investment),
            other => Err(format!("unknown transaction type {other:?}")),
        }
    }
}

/// Represents a row of `transactions` as inserted.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub wallet_id: Uuid,
    pub transaction_type: String,
    pub category_id: Option<i32>,
    pub personal_category_id: Option<Uuid>,

    /// Always positive; the direction comes from `transaction_type`
    pub amount: i64,

    pub description: Option<String>,
    pub transaction_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Transaction joined with its detail row and category name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub wallet_id: Uuid,
    pub transaction_type: String,
    pub category_id: Option<i32>,
    pub personal_category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub amount: i64,
    pub description: Option<String>,
    pub transaction_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub destination_wallet_id: Option<Uuid>,
    pub investment_item_id: Option<i32>,
    pub quantity: Option<Decimal>,
    pub price_per_unit: Option<i64>,
    pub note: Option<String>,
    pub attachment_url: Option<String>,
}

/// Values for a new `transactions` row.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: Uuid,
    pub wallet_id: Uuid,
    pub transaction_type: TransactionType,
    pub category_id: Option<i32>,
    pub personal_category_id: Option<Uuid>,
    pub amount: i64,
    pub description: Option<String>,
    pub transaction_at: DateTime<Utc>,
}

/// Values for a new `transaction_details` row.
#[derive(Debug, Clone, Default)]
pub struct NewTransactionDetail {
    pub destination_wallet_id: Option<Uuid>,
    pub investment_item_id: Option<i32>,
    pub quantity: Option<Decimal>,
    pub price_per_unit: Option<i64>,
    pub note: Option<String>,
    pub attachment_url: Option<String>,
}

/// Request body for `POST /api/v1/transactions`.
///
/// ```json
/// {
///   "wallet_id": "550e8400-e29b-41d4-a716-446655440000",
///   "transaction_type": "spending",
///   "amount": 45000,
///   "category_id": 4,
///   "description": "Lunch",
///   "note": "with the team"
/// }
/// ```
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateTransactionRequest {
    pub wallet_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: i64,
    #[serde(default)]
    pub category_id: Option<i32>,
    #[serde(default)]
    pub personal_category_id: Option<Uuid>,
    #[serde(default)]
    pub transaction_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub attachment_url: Option<String>,
}

/// Request body for `POST /api/v1/transactions/transfer`.
///
/// Both wallets are updated in the same database transaction.
#[derive(Debug, Deserialize, Serialize)]
pub struct TransferRequest {
    pub from_wallet_id: Uuid,
    pub to_wallet_id: Uuid,
    pub amount: i64,
    #[serde(default)]
    pub transaction_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// `GET /api/v1/transactions` filters. Dates are inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionFilter {
    #[serde(default)]
    pub wallet_id: Option<Uuid>,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl TransactionFilter {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionDetailResponse {
    pub destination_wallet_id: Option<Uuid>,
    pub investment_item_id: Option<i32>,
    pub quantity: Option<Decimal>,
    pub price_per_unit: Option<i64>,
    pub note: Option<String>,
    pub attachment_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub transaction_type: String,
    pub category_id: Option<i32>,
    pub personal_category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub amount: i64,
    pub description: Option<String>,
    pub transaction_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub detail: TransactionDetailResponse,
}

impl From<TransactionRecord> for TransactionResponse {
    fn from(record: TransactionRecord) -> Self {
        Self {
            id: record.id,
            wallet_id: record.wallet_id,
            transaction_type: record.transaction_type,
            category_id: record.category_id,
            personal_category_id: record.personal_category_id,
            category_name: record.category_name,
            amount: record.amount,
            description: record.description,
            transaction_at: record.transaction_at,
            created_at: record.created_at,
            detail: TransactionDetailResponse {
                destination_wallet_id: record.destination_wallet_id,
                investment_item_id: record.investment_item_id,
                quantity: record.quantity,
                price_per_unit: record.price_per_unit,
                note: record.note,
                attachment_url: record.attachment_url,
            },
        }
    }
}

/// Signed balance changes caused by a non-investment transaction.
///
/// Returns `None` for investment transactions, whose direction depends on
/// the buy/sell side stored with the investment.
pub fn balance_effects(
    transaction_type: TransactionType,
    wallet_id: Uuid,
    destination_wallet_id: Option<Uuid>,
    amount: i64,
) -> Option<Vec<(Uuid, i64)>> {
    match transaction_type {
        TransactionType::Income => Some(vec![(wallet_id, amount)]),
        TransactionType::Spending => Some(vec![(wallet_id, -amount)]),
        TransactionType::Transfer => {
            let destination = destination_wallet_id?;
            Some(vec![(wallet_id, -amount), (destination, amount)])
        }
        TransactionType::Investment => None,
    }
}
