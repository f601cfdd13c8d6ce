//! Account use cases: sign-up, sign-in and profile management.
//!
//! # Referral Codes
//!
//! Every account gets an 8-character code on sign-up, drawn from an
//! alphabet without look-alike characters (`0/O`, `1/I`). The code is
//! stored both on the account and on its `rewards` row, which anchors
//! the account in the referral tree.

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::{
    auth::{
        JwtKeys,
        password::{hash_password, verify_password},
    },
    db::DbPool,
    error::{AppError, AppResult, Resource, is_unique_violation},
    models::{
        account::{
            AccountTier, ChangePasswordRequest, ProfileResponse, SignInRequest, SignInResponse,
            SignUpRequest, SignUpResponse, UpdateProfileRequest,
        },
        notification::NotificationKind,
        track::ClientInfo,
    },
    repositories::{account_repository, referral_repository, track_repository},
    services::notification_service,
    validation::Validator,
};

const REFERRAL_CODE_LEN: usize = 8;
const REFERRAL_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const REFERRAL_CODE_ATTEMPTS: usize = 5;

/// Register a new account.
///
/// # Process
///
/// 1. Validate the request and check the email is free
/// 2. Resolve the referrer, if a code was given
/// 3. Hash the password
/// 4. Insert account, credentials, reward row and welcome notification
///    in one transaction
///
/// # Errors
///
/// - `Validation`: bad fields or unknown referral code
/// - `EmailAlreadyRegistered`: email taken (also when a concurrent
///   sign-up wins the race on the unique index)
pub async fn sign_up(pool: &DbPool, request: SignUpRequest, bcrypt_cost: u32) -> AppResult<SignUpResponse> {
    Validator::new()
        .text("name", &request.name, 100)
        .email(request.email.trim())
        .password("password", &request.password)
        .finish()?;

    let name = request.name.trim().to_string();
    let email = request.email.trim().to_lowercase();

    if account_repository::email_exists(pool, &email).await? {
        return Err(AppError::EmailAlreadyRegistered);
    }

    let referred_by = match normalize_code(request.referral_code.as_deref()) {
        Some(code) => {
            let referrer = referral_repository::find_by_code(pool, &code)
                .await?
                .ok_or_else(|| {
                    AppError::invalid_field("invalid_referral_code", "referral_code does not exist")
                })?;
            Some(referrer.referral_code)
        }
        None => None,
    };

    let password_hash = hash_password(request.password, bcrypt_cost).await?;
    let referral_code = unused_referral_code(pool).await?;

    let mut tx = pool.begin().await?;

    let account = account_repository::insert_account(&mut *tx, &name, &email, &referral_code)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::EmailAlreadyRegistered
            } else {
                AppError::Database(e)
            }
        })?;
    account_repository::insert_authentication(&mut *tx, account.id, &password_hash).await?;
    referral_repository::insert_reward(&mut *tx, account.id, &referral_code, referred_by.as_deref())
        .await?;
    notification_service::notify(
        &mut *tx,
        account.id,
        NotificationKind::Welcome,
        "Welcome aboard",
        "Create your first wallet to start tracking your money.",
    )
    .await?;

    tx.commit().await?;

    tracing::info!(account_id = %account.id, referred = referred_by.is_some(), "Account created");

    Ok(SignUpResponse {
        account_id: account.id,
        role: account.tier(Utc::now()),
        name: account.name,
        email: account.email,
        referral_code: account.referral_code,
    })
}

/// Authenticate with email and password and issue an access token.
///
/// Unknown email and wrong password both answer `InvalidCredentials`.
pub async fn sign_in(
    pool: &DbPool,
    keys: &JwtKeys,
    request: SignInRequest,
    client: ClientInfo,
) -> AppResult<SignInResponse> {
    let credentials = account_repository::find_credentials_by_email(pool, request.email.trim())
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(request.password, credentials.password_hash).await? {
        tracing::info!(account_id = %credentials.account_id, "Rejected sign-in with wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let now = Utc::now();
    let role = AccountTier::at(credentials.subscription_expires_at, now);
    let (access_token, expires_at) = keys
        .issue(credentials.account_id, &credentials.email, role, now)
        .map_err(|e| AppError::Internal(format!("token issue failed: {e}")))?;

    let mut tx = pool.begin().await?;
    account_repository::touch_last_sign_in(&mut *tx, credentials.account_id).await?;
    track_repository::insert(&mut *tx, credentials.account_id, &client).await?;
    tx.commit().await?;

    Ok(SignInResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_at,
        role,
    })
}

pub async fn profile(pool: &DbPool, account_id: Uuid) -> AppResult<ProfileResponse> {
    let account = account_repository::find_by_id(pool, account_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Account))?;
    Ok(ProfileResponse::new(account, Utc::now()))
}

pub async fn update_profile(
    pool: &DbPool,
    account_id: Uuid,
    request: UpdateProfileRequest,
) -> AppResult<ProfileResponse> {
    let mut validator = Validator::new();
    if let Some(name) = &request.name {
        validator.text("name", name, 100);
    }
    if let Some(phone) = &request.phone {
        validator.text("phone", phone, 32).check(
            phone
                .trim()
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ')),
            "invalid_phone",
            "phone may only contain digits, spaces, '+' and '-'",
        );
    }
    validator.finish()?;

    let account = account_repository::update_profile(
        pool,
        account_id,
        request.name.as_deref().map(str::trim),
        request.phone.as_deref().map(str::trim),
    )
    .await?
    .ok_or(AppError::NotFound(Resource::Account))?;

    Ok(ProfileResponse::new(account, Utc::now()))
}

/// Replace the password after checking the current one.
pub async fn change_password(
    pool: &DbPool,
    account_id: Uuid,
    request: ChangePasswordRequest,
    bcrypt_cost: u32,
) -> AppResult<()> {
    Validator::new()
        .password("new_password", &request.new_password)
        .check(
            request.new_password != request.current_password,
            "password_unchanged",
            "new_password must differ from current_password",
        )
        .finish()?;

    let current_hash = account_repository::find_password_hash(pool, account_id)
        .await?
        .ok_or(AppError::NotFound(Resource::Account))?;

    if !verify_password(request.current_password, current_hash).await? {
        return Err(AppError::InvalidCredentials);
    }

    let new_hash = hash_password(request.new_password, bcrypt_cost).await?;
    account_repository::update_password(pool, account_id, &new_hash).await?;

    tracing::info!(%account_id, "Password changed");
    Ok(())
}

/// Soft-delete the account. Its email becomes available again.
pub async fn delete_account(pool: &DbPool, account_id: Uuid) -> AppResult<()> {
    if account_repository::soft_delete(pool, account_id).await? == 0 {
        return Err(AppError::NotFound(Resource::Account));
    }
    tracing::info!(%account_id, "Account deleted");
    Ok(())
}

/// Trimmed upper-case referral code, or `None` when absent or blank.
pub(crate) fn normalize_code(code: Option<&str>) -> Option<String> {
    code.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_ascii_uppercase)
}

fn generate_referral_code() -> String {
    let mut rng = rand::rng();
    (0..REFERRAL_CODE_LEN)
        .map(|_| {
            let index = rng.random_range(0..REFERRAL_CODE_ALPHABET.len());
            char::from(REFERRAL_CODE_ALPHABET[index])
        })
        .collect()
}

async fn unused_referral_code(pool: &DbPool) -> AppResult<String> {
    for _ in 0..REFERRAL_CODE_ATTEMPTS {
        let code = generate_referral_code();
        if !referral_repository::code_exists(pool, &code).await? {
            return Ok(code);
        }
    }
    Err(AppError::Internal(
        "could not generate an unused referral code".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referral_codes_use_the_unambiguous_alphabet() {
        for _ in 0..50 {
            let code = generate_referral_code();
            assert_eq!(code.len(), REFERRAL_CODE_LEN);
            assert!(code.bytes().all(|b| REFERRAL_CODE_ALPHABET.contains(&b)));
            assert!(!code.contains('O') && !code.contains('0'));
        }
    }

    #[test]
    fn codes_are_normalized() {
        assert_eq!(normalize_code(Some("  ab12cd34 ")), Some("AB12CD34".to_string()));
        assert_eq!(normalize_code(Some("   ")), None);
        assert_eq!(normalize_code(None), None);
    }
}
