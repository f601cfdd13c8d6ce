//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
/// - `JWT_SECRET` (required): HMAC key for access tokens
/// - `JWT_TTL_MINUTES` (optional): access token lifetime, defaults to 1440
/// - `BCRYPT_COST` (optional): password hashing cost, defaults to 12
/// - `MIDTRANS_SERVER_KEY` (required): payment gateway server key
/// - `MIDTRANS_SNAP_URL` (optional): Snap transaction endpoint, defaults to sandbox
/// - `MIDTRANS_TIMEOUT_SECS` (optional): gateway request timeout, defaults to 10
/// - `REFERRAL_TIER_RATES_BPS` (optional): commission per tier in basis points, defaults to `1000,500,200`
/// - `FREE_WALLET_LIMIT` (optional): wallets allowed on the free tier, defaults to 2
/// - `CORS_ALLOW_ANY` (optional): permissive CORS, defaults to true
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    pub jwt_secret: String,

    #[serde(default = "default_jwt_ttl_minutes")]
    pub jwt_ttl_minutes: i64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    pub midtrans_server_key: String,

    #[serde(default = "default_midtrans_snap_url")]
    pub midtrans_snap_url: String,

    #[serde(default = "default_midtrans_timeout_secs")]
    pub midtrans_timeout_secs: u64,

    #[serde(default = "default_referral_tier_rates_bps")]
    pub referral_tier_rates_bps: Vec<i64>,

    #[serde(default = "default_free_wallet_limit")]
    pub free_wallet_limit: i64,

    #[serde(default = "default_cors_allow_any")]
    pub cors_allow_any: bool,
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_jwt_ttl_minutes() -> i64 {
    24 * 60
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_midtrans_snap_url() -> String {
    "https://app.sandbox.midtrans.com/snap/v1/transactions".to_string()
}

fn default_midtrans_timeout_secs() -> u64 {
    10
}

fn default_referral_tier_rates_bps() -> Vec<i64> {
    vec![1000, 500, 200]
}

fn default_free_wallet_limit() -> i64 {
    2
}

fn default_cors_allow_any() -> bool {
    true
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] envy::Error),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Loads an optional `.env` file first, then deserializes the process
    /// environment. Field names map to upper-case variables
    /// (`database_url` -> `DATABASE_URL`).
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a value cannot be
    /// parsed, or a value fails [`Config::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = envy::from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET",
                "must be at least 32 bytes".to_string(),
            ));
        }

        if self.jwt_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidValue(
                "JWT_TTL_MINUTES",
                "must be positive".to_string(),
            ));
        }

        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue(
                "BCRYPT_COST",
                "must be between 4 and 31".to_string(),
            ));
        }

        let snap_url = url::Url::parse(&self.midtrans_snap_url)
            .map_err(|e| ConfigError::InvalidValue("MIDTRANS_SNAP_URL", e.to_string()))?;
        if snap_url.scheme() != "https" && snap_url.host_str() != Some("localhost") {
            return Err(ConfigError::InvalidValue(
                "MIDTRANS_SNAP_URL",
                "must use https".to_string(),
            ));
        }

        if self.referral_tier_rates_bps.is_empty()
            || self
                .referral_tier_rates_bps
                .iter()
                .any(|rate| !(0..=10_000).contains(rate))
        {
            return Err(ConfigError::InvalidValue(
                "REFERRAL_TIER_RATES_BPS",
                "expected 1+ comma-separated values in 0..=10000".to_string(),
            ));
        }

        if self.free_wallet_limit < 1 {
            return Err(ConfigError::InvalidValue(
                "FREE_WALLET_LIMIT",
                "must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/fintrack_test".to_string(),
        server_port: 3000,
        database_max_connections: 1,
        jwt_secret: "test-secret-test-secret-test-secret!".to_string(),
        jwt_ttl_minutes: 60,
        bcrypt_cost: 4,
        midtrans_server_key: "SB-Mid-server-test".to_string(),
        midtrans_snap_url: default_midtrans_snap_url(),
        midtrans_timeout_secs: 5,
        referral_tier_rates_bps: default_referral_tier_rates_bps(),
        free_wallet_limit: 2,
        cors_allow_any: true,
    }
}
