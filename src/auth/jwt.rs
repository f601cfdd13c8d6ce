//! HS256 access tokens.
//!
//! Encoding and verification go through `jsonwebtoken`; only `HS256` is
//! accepted and expiry is checked without leeway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::AccountTier;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,

    #[error("token signature does not match")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token could not be encoded: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnsupportedAlgorithm
            }
            _ => TokenError::Malformed,
        }
    }
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: Uuid,
    pub email: String,
    /// Tier at the time the token was issued
    pub role: AccountTier,
    pub iat: i64,
    pub exp: i64,
}

/// Signing keys plus token lifetime, shared by the sign-in use case and the
/// auth middleware.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Issue a token for `account_id` valid from `now` for the configured TTL.
    ///
    /// Returns the encoded token and its expiry.
    pub fn issue(
        &self,
        account_id: Uuid,
        email: &str,
        role: AccountTier,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), TokenError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            sub: account_id,
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encoding)?;
        Ok((token, expires_at))
    }

    /// Verify signature and expiry against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new("test-secret-test-secret-test-secret!", 60)
    }

    #[test]
    fn issued_token_verifies() {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let (token, expires_at) = keys()
            .issue(id, "budi@example.com", AccountTier::Premium, now)
            .unwrap();

        let claims = keys().verify(&token).unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, AccountTier::Premium);
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now() - Duration::hours(2);
        let (token, _) = keys()
            .issue(Uuid::new_v4(), "budi@example.com", AccountTier::Free, issued)
            .unwrap();

        assert!(matches!(keys().verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_from_other_key_is_rejected() {
        let other = JwtKeys::new("another-secret-another-secret-12345", 60);
        let (token, _) = other
            .issue(Uuid::new_v4(), "budi@example.com", AccountTier::Free, Utc::now())
            .unwrap();

        assert!(matches!(keys().verify(&token), Err(TokenError::BadSignature)));
    }

    #[test]
    fn swapped_payload_is_rejected() {
        let now = Utc::now();
        let (token, _) = keys()
            .issue(Uuid::new_v4(), "budi@example.com", AccountTier::Free, now)
            .unwrap();
        let (other, _) = JwtKeys::new("another-secret-another-secret-12345", 60)
            .issue(Uuid::new_v4(), "mallory@example.com", AccountTier::Premium, now)
            .unwrap();

        let ours: Vec<&str> = token.split('.').collect();
        let theirs: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", ours[0], theirs[1], ours[2]);

        assert!(matches!(keys().verify(&forged), Err(TokenError::BadSignature)));
    }

    #[test]
    fn other_algorithm_is_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "budi@example.com".to_string(),
            role: AccountTier::Free,
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret-test-secret-test-secret!"),
        )
        .unwrap();

        assert!(matches!(
            keys().verify(&token),
            Err(TokenError::UnsupportedAlgorithm)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(keys().verify("not-a-token"), Err(TokenError::Malformed)));
        assert!(matches!(keys().verify("a.b.c"), Err(TokenError::Malformed)));
    }
}
