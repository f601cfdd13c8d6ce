//! Wallet models and API request/response types.
//!
//! A wallet is a named money container (cash, bank card, e-wallet,
//! investment) owned by one account. Its balance lives in a separate
//! `wallet_balances` row that is created together with the wallet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wallet joined with its type and balance.
///
/// # Balance Storage
///
/// Balances are `i64` amounts in the currency's minor unit and are kept
/// non-negative by a CHECK constraint.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Wallet {
    pub id: Uuid,
    pub account_id: Uuid,
    pub wallet_type_id: i32,
    pub wallet_type_code: String,
    pub name: String,
    pub currency: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Balance row locked with `FOR UPDATE` while a transaction is applied.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LockedWallet {
    pub id: Uuid,
    pub wallet_type_code: String,
    pub currency: String,
    pub balance: i64,
}

/// Request body for `POST /api/v1/wallets`.
///
/// ```json
/// {
///   "name": "BCA Debit",
///   "wallet_type_id": 2,
///   "currency": "IDR",
///   "initial_balance": 1500000
/// }
/// ```
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateWalletRequest {
    pub name: String,
    pub wallet_type_id: i32,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub initial_balance: i64,
}

fn default_currency() -> String {
    "IDR".to_string()
}

#[derive(Debug, Deserialize)]
pub struct UpdateWalletRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletResponse {
    pub id: Uuid,
    pub name: String,
    pub wallet_type_id: i32,
    pub wallet_type: String,
    pub currency: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Drops the owning account id.
impl From<Wallet> for WalletResponse {
    fn from(wallet: Wallet) -> Self {
        Self {
            id: wallet.id,
            name: wallet.name,
            wallet_type_id: wallet.wallet_type_id,
            wallet_type: wallet.wallet_type_code,
            currency: wallet.currency,
            balance: wallet.balance,
            created_at: wallet.created_at,
            updated_at: wallet.updated_at,
        }
    }
}
