//! Password hashing with bcrypt.
//!
//! bcrypt is deliberately slow, so both operations run on the blocking pool
//! rather than on the async worker threads.

use crate::error::AppError;

/// Salt and hash `password` with the given bcrypt `cost`.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Check `password` against a stored bcrypt hash.
///
/// A corrupt stored hash counts as a mismatch, not a server error, so the
/// caller answers with the usual invalid-credentials response.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("password verification task failed: {e}")))?;

    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::warn!("Stored password hash could not be parsed: {}", e);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("s3cretpass".to_string(), 4).await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("s3cretpass".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrongpass1".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn corrupt_hash_is_a_mismatch() {
        assert!(
            !verify_password("s3cretpass".to_string(), "not-a-hash".to_string())
                .await
                .unwrap()
        );
    }
}
