//! Identity store.
//!
//! The only module that touches the `users` table's credential column.
//! Everything else sees users through [`UserRecord`] (internal, carries the
//! password hash) or the public `models::User` view. Password hashing is
//! delegated to `auth::password` (bcrypt).

use crate::auth::gate::ROLE_USER;
use crate::auth::password;
use crate::auth::RegisterRequest;
use crate::error::AppError;
use crate::models::User;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

/// A user row as stored, including the password hash. Never serialized
/// out; convert to `models::User` for responses.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub country: String,
    pub image_url: Option<String>,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            username: record.username,
            email: record.email,
            phone: record.phone,
            country: record.country,
            image_url: record.image_url,
            roles: record.roles,
            created_at: record.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, phone, country, image_url, roles, created_at";

/// Creates a user with a freshly hashed password and the base `user` role.
pub async fn create_user(pool: &PgPool, input: &RegisterRequest) -> Result<UserRecord, AppError> {
    let password_hash = password::hash_password(&input.password)?;

    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "INSERT INTO users (username, email, password_hash, phone, country, image_url, roles)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&input.username)
    .bind(&input.email)
    .bind(&password_hash)
    .bind(&input.phone)
    .bind(&input.country)
    .bind(&input.image_url)
    .bind(vec![ROLE_USER.to_string()])
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, user_id: i32) -> Result<Option<UserRecord>, AppError> {
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<UserRecord>, AppError> {
    let user = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn username_or_email_taken(
    pool: &PgPool,
    username: &str,
    email: &str,
) -> Result<bool, AppError> {
    let existing = sqlx::query_scalar::<_, i32>(
        "SELECT id FROM users WHERE username = $1 OR email = $2 LIMIT 1",
    )
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(existing.is_some())
}

/// Checks a plaintext password against the stored hash.
pub fn verify_password(record: &UserRecord, password: &str) -> Result<bool, AppError> {
    password::verify_password(password, &record.password_hash)
}

pub async fn get_roles(pool: &PgPool, user_id: i32) -> Result<Vec<String>, AppError> {
    let roles = sqlx::query_scalar::<_, Vec<String>>("SELECT roles FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    roles.ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Grants a role if the user does not already hold it.
pub async fn assign_role(pool: &PgPool, user_id: i32, role: &str) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE users SET roles = array_append(roles, $2)
         WHERE id = $1 AND NOT ($2 = ANY(roles))",
    )
    .bind(user_id)
    .bind(role)
    .execute(pool)
    .await?;

    // Zero rows means either an unknown user or an already-held role;
    // distinguish so callers see a real 404.
    if result.rows_affected() == 0 && find_by_id(pool, user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(())
}

/// Deletes a user; tasks and refresh tokens cascade in the schema.
pub async fn delete_user(pool: &PgPool, user_id: i32) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(())
}
