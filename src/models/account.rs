//! Personal account models and API request/response types.
//!
//! This module defines:
//! - `PersonalAccount`: profile row from `personal_accounts`
//! - `AccountCredentials`: the join used by sign-in
//! - `AccountTier`: free/premium, derived from the subscription expiry
//! - Request and response bodies for the accounts endpoints

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account tier ("role" in API responses).
///
/// An account is `premium` while its subscription expiry lies in the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountTier {
    Free,
    Premium,
}

impl AccountTier {
    pub fn at(subscription_expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match subscription_expires_at {
            Some(expires_at) if expires_at > now => AccountTier::Premium,
            _ => AccountTier::Free,
        }
    }

    /// Maximum number of wallets, `None` meaning unlimited.
    pub fn wallet_limit(self, free_limit: i64) -> Option<i64> {
        match self {
            AccountTier::Free => Some(free_limit),
            AccountTier::Premium => None,
        }
    }
}

/// Represents a personal account record from the database.
///
/// # Database Table
///
/// Maps to `personal_accounts`. Soft-deleted rows (`deleted_at` set) are
/// never loaded into this type.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct PersonalAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,

    /// Code other users enter to join this account's referral tree
    pub referral_code: String,

    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersonalAccount {
    pub fn tier(&self, now: DateTime<Utc>) -> AccountTier {
        AccountTier::at(self.subscription_expires_at, now)
    }
}

/// Account joined with its `authentications` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountCredentials {
    pub account_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub subscription_expires_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /api/v1/accounts/sign-up`.
///
/// ```json
/// {
///   "name": "Budi Santoso",
///   "email": "budi@example.com",
///   "password": "s3cretpass",
///   "referral_code": "K7Q2M9XA"
/// }
/// ```
#[derive(Debug, Deserialize, Serialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,

    /// Referral code of the account that invited this user
    #[serde(default)]
    pub referral_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub account_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: AccountTier,
    pub referral_code: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Response body for a successful sign-in.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub role: AccountTier,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: AccountTier,
    pub referral_code: String,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn new(account: PersonalAccount, now: DateTime<Utc>) -> Self {
        Self {
            role: account.tier(now),
            id: account.id,
            name: account.name,
            email: account.email,
            phone: account.phone,
            referral_code: account.referral_code,
            subscription_expires_at: account.subscription_expires_at,
            created_at: account.created_at,
        }
    }
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn tier_follows_subscription_expiry() {
        let now = Utc::now();
        assert_eq!(AccountTier::at(None, now), AccountTier::Free);
        assert_eq!(
            AccountTier::at(Some(now - Duration::seconds(1)), now),
            AccountTier::Free
        );
        assert_eq!(
            AccountTier::at(Some(now + Duration::days(3)), now),
            AccountTier::Premium
        );
    }

    #[test]
    fn only_free_tier_is_capped() {
        assert_eq!(AccountTier::Free.wallet_limit(2), Some(2));
        assert_eq!(AccountTier::Premium.wallet_limit(2), None);
    }

    #[test]
    fn tier_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&AccountTier::Premium).unwrap(),
            "\"premium\""
        );
    }
}
