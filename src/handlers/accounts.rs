//! Account HTTP handlers.
//!
//! This module implements account-related API endpoints:
//! - POST /api/v1/accounts/sign-up - Register
//! - POST /api/v1/accounts/sign-in - Exchange credentials for an access token
//! - GET /api/v1/accounts/profile - Current profile and tier
//! - PATCH /api/v1/accounts/profile - Update name and phone
//! - PATCH /api/v1/accounts/password - Change password
//! - DELETE /api/v1/accounts - Close the account

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
};

use crate::{
    auth::JwtKeys,
    config::Config,
    db::DbPool,
    error::AppError,
    extract::AppJson,
    middleware::auth::AuthContext,
    models::{
        account::{
            ChangePasswordRequest, ProfileResponse, SignInRequest, SignInResponse, SignUpRequest,
            SignUpResponse, UpdateProfileRequest,
        },
        track::ClientInfo,
    },
    services::account_service,
};

/// Register a new account.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Budi Santoso",
///   "email": "budi@example.com",
///   "password": "rahasia123",
///   "referral_code": "K7QM2XPA"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "account_id": "550e8400-...",
///   "name": "Budi Santoso",
///   "email": "budi@example.com",
///   "role": "free",
///   "referral_code": "T4NW8HCE"
/// }
/// ```
pub async fn sign_up(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    AppJson(request): AppJson<SignUpRequest>,
) -> Result<(StatusCode, Json<SignUpResponse>), AppError> {
    let response = account_service::sign_up(&pool, request, config.bcrypt_cost).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Sign in.
///
/// # Response (200)
///
/// ```json
/// {
///   "access_token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
///   "token_type": "Bearer",
///   "expires_at": "2025-01-16T08:00:00Z",
///   "role": "premium"
/// }
/// ```
pub async fn sign_in(
    State(pool): State<DbPool>,
    State(keys): State<JwtKeys>,
    headers: HeaderMap,
    AppJson(request): AppJson<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    let response = account_service::sign_in(&pool, &keys, request, client_info(&headers)).await?;
    Ok(Json(response))
}

pub async fn get_profile(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(account_service::profile(&pool, auth.account_id).await?))
}

pub async fn update_profile(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
    AppJson(request): AppJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(
        account_service::update_profile(&pool, auth.account_id, request).await?,
    ))
}

/// Change password. Answers 401 when `current_password` is wrong.
pub async fn change_password(
    State(pool): State<DbPool>,
    State(config): State<Arc<Config>>,
    Extension(auth): Extension<AuthContext>,
    AppJson(request): AppJson<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    account_service::change_password(&pool, auth.account_id, request, config.bcrypt_cost).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_account(
    State(pool): State<DbPool>,
    Extension(auth): Extension<AuthContext>,
) -> Result<StatusCode, AppError> {
    account_service::delete_account(&pool, auth.account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Client address and user agent for the sign-in log.
///
/// Behind a proxy the first `X-Forwarded-For` entry is the client;
/// `X-Real-IP` is the fallback.
fn client_info(headers: &HeaderMap) -> ClientInfo {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let ip_address = header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip"))
        .map(|v| v.chars().take(64).collect());

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.chars().take(512).collect());

    ClientInfo {
        ip_address,
        user_agent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        headers.insert(USER_AGENT, HeaderValue::from_static("FinTrack/1.0 (Android)"));

        let info = client_info(&headers);
        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.user_agent.as_deref(), Some("FinTrack/1.0 (Android)"));
    }

    #[test]
    fn falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));

        let info = client_info(&headers);
        assert_eq!(info.ip_address.as_deref(), Some("198.51.100.4"));
        assert_eq!(info.user_agent, None);
    }

    #[test]
    fn no_headers() {
        let info = client_info(&HeaderMap::new());
        assert!(info.ip_address.is_none() && info.user_agent.is_none());
    }
}
