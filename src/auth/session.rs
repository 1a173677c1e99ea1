//! Login and refresh-exchange orchestration.
//!
//! Both operations end the same way: a fresh access/refresh pair is issued
//! and the user's stored refresh token is replaced. A refresh token is
//! therefore good for exactly one exchange; presenting it a second time
//! finds no matching row.

use crate::auth::token;
use crate::auth::{refresh, LoginRequest, RefreshRequest, TokenResponse};
use crate::config::AuthPolicy;
use crate::error::AppError;
use crate::identity::{self, UserRecord};
use chrono::{Duration, Utc};
use sqlx::PgPool;

/// Credential failures never disclose which field was wrong.
const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Authenticates a user and issues a token pair.
pub async fn login(
    pool: &PgPool,
    policy: &AuthPolicy,
    request: &LoginRequest,
    requester_ip: &str,
) -> Result<TokenResponse, AppError> {
    let user = identity::find_by_username(pool, &request.username)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    if !identity::verify_password(&user, &request.password)? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    issue_session(pool, policy, &user, requester_ip).await
}

/// Exchanges an expired access token plus a live refresh token for a new pair.
///
/// The checks run in order: both tokens present, identity recoverable from
/// the access token, user still exists, presented refresh token matches the
/// stored one, stored token not expired. Failures surface only the coarse
/// category, never which comparison failed.
pub async fn refresh(
    pool: &PgPool,
    policy: &AuthPolicy,
    request: &RefreshRequest,
    requester_ip: &str,
) -> Result<TokenResponse, AppError> {
    if request.access_token.is_empty() || request.refresh_token.is_empty() {
        return Err(AppError::BadRequest(
            "accessToken and refreshToken are required".into(),
        ));
    }

    let claims = token::decode_expired_access_token(&request.access_token, policy)
        .ok_or_else(|| AppError::Unauthorized("Invalid access token".into()))?;

    let user = identity::find_by_id(pool, claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let stored = refresh::find_by_user_and_token(pool, user.id, &request.refresh_token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".into()))?;

    if stored.is_expired(Utc::now()) {
        return Err(AppError::Unauthorized("Refresh token expired".into()));
    }

    issue_session(pool, policy, &user, requester_ip).await
}

/// Issues a token pair and rotates the stored refresh token, the shared
/// tail of both login and refresh.
async fn issue_session(
    pool: &PgPool,
    policy: &AuthPolicy,
    user: &UserRecord,
    requester_ip: &str,
) -> Result<TokenResponse, AppError> {
    let (access_token, expiration) = token::issue_access_token(
        user.id,
        &user.username,
        Some(&user.email),
        user.roles.clone(),
        policy,
    )?;

    let refresh_token = token::generate_refresh_token();
    let refresh_token_expiry = Utc::now() + Duration::days(policy.refresh_token_days);

    refresh::replace_for_user(pool, user.id, &refresh_token, refresh_token_expiry, requester_ip)
        .await?;

    log::info!("issued token pair for user {}", user.id);

    Ok(TokenResponse {
        token: access_token,
        expiration,
        refresh_token,
        refresh_token_expiry,
    })
}
