pub mod extractors;
pub mod gate;
pub mod middleware;
pub mod password;
pub mod refresh;
pub mod session;
pub mod token;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use gate::{decide, Decision, ROLE_ADMIN, ROLE_USER};
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{
    decode_expired_access_token, generate_refresh_token, issue_access_token, verify_access_token,
    Claims,
};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username of the account.
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    /// User's password.
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username for the new account.
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Email address for the new account.
    /// Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// Password for the new account.
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
    /// Optional phone number.
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    /// Country of residence.
    #[validate(length(min = 2, max = 56))]
    pub country: String,
    /// Optional URL of an already-hosted profile image.
    #[serde(default, rename = "imageUrl")]
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
}

/// Represents the payload for a refresh exchange: the expired (or expiring)
/// access token plus the opaque refresh token returned with it.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

/// Response structure after successful authentication or refresh.
/// Carries the signed access token and the opaque refresh token, each with
/// its expiry instant.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// The JWT access token for request authentication.
    pub token: String,
    /// When the access token expires.
    pub expiration: DateTime<Utc>,
    /// The opaque refresh token; valid for exactly one exchange.
    pub refresh_token: String,
    /// When the refresh token expires.
    pub refresh_token_expiry: DateTime<Utc>,
}
