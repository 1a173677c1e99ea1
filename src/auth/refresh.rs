//! Per-user refresh-token storage.
//!
//! Each user holds at most one live refresh token. Issuing a new one is a
//! hard overwrite inside a single transaction, so a crash between delete
//! and insert can never leave two live tokens for the same user.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

/// A stored refresh token row. The token value is opaque; its only meaning
/// is the mapping to `user_id` held here.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: i32,
    pub token: String,
    pub user_id: i32,
    pub expiry_date: DateTime<Utc>,
    pub created_date: DateTime<Utc>,
    pub created_by_ip: String,
}

impl RefreshToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_date
    }
}

/// Replaces the user's refresh token with a new one.
///
/// Delete-then-insert in one transaction. Two concurrent exchanges for the
/// same user race and the last writer wins; there is no optimistic lock.
pub async fn replace_for_user(
    pool: &PgPool,
    user_id: i32,
    token: &str,
    expiry_date: DateTime<Utc>,
    created_by_ip: &str,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO refresh_tokens (token, user_id, expiry_date, created_by_ip)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(token)
    .bind(user_id)
    .bind(expiry_date)
    .bind(created_by_ip)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Looks up the stored token for a user matching the presented value.
pub async fn find_by_user_and_token(
    pool: &PgPool,
    user_id: i32,
    token: &str,
) -> Result<Option<RefreshToken>, AppError> {
    let row = sqlx::query_as::<_, RefreshToken>(
        "SELECT id, token, user_id, expiry_date, created_date, created_by_ip
         FROM refresh_tokens WHERE user_id = $1 AND token = $2",
    )
    .bind(user_id)
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
