use crate::config::AuthPolicy;
use crate::error::AppError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Size of the random material behind an opaque refresh token.
const REFRESH_TOKEN_BYTES: usize = 64;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token, typically the user's unique identifier.
    pub sub: i32, // user id
    /// Username of the subject.
    pub name: String,
    /// Email of the subject, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Roles granted to the subject.
    #[serde(default)]
    pub roles: Vec<String>,
    /// Issuer of the token.
    pub iss: String,
    /// Intended audience of the token.
    pub aud: String,
    /// Issuance timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: i64,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Generates a signed access token for a user.
///
/// The token is HMAC-SHA256 signed with the policy secret and expires
/// `policy.access_token_minutes` from now. The policy is validated at
/// startup, so a usable secret is an invariant here rather than a per-call
/// concern.
///
/// # Returns
/// The encoded token together with its expiry instant.
pub fn issue_access_token(
    user_id: i32,
    username: &str,
    email: Option<&str>,
    roles: Vec<String>,
    policy: &AuthPolicy,
) -> Result<(String, DateTime<Utc>), AppError> {
    let issued_at = Utc::now();
    let expires_at = issued_at + Duration::minutes(policy.access_token_minutes);

    let claims = Claims {
        sub: user_id,
        name: username.to_string(),
        email: email.map(|e| e.to_string()),
        roles,
        iss: policy.issuer.clone(),
        aud: policy.audience.clone(),
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(policy.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))?;

    Ok((token, expires_at))
}

/// Generates an opaque refresh token: 64 bytes from the OS CSPRNG,
/// URL-safe base64 encoded. It carries no claims; the server maps it to a
/// user through the refresh-token store.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn base_validation(policy: &AuthPolicy) -> Validation {
    // Pinning the algorithm rejects tokens whose header names anything
    // other than HS256, regardless of their signature.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&policy.issuer]);
    validation.set_audience(&[&policy.audience]);
    validation
}

/// Verifies an access token and decodes its claims.
///
/// Full validation: signature, algorithm, issuer, audience, and expiry.
/// This is the check applied by the request middleware.
pub fn verify_access_token(token: &str, policy: &AuthPolicy) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(policy.secret.as_bytes()),
        &base_validation(policy),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Extracts claims from a possibly-expired access token.
///
/// Signature, algorithm, issuer, and audience are verified as usual; only
/// the expiry check is skipped. This exists solely so the refresh exchange
/// can recover the caller's identity from the expired token it presents.
///
/// Any structural or cryptographic failure yields `None`; callers treat
/// that as "invalid, reject" without distinguishing the cause.
pub fn decode_expired_access_token(token: &str, policy: &AuthPolicy) -> Option<Claims> {
    let mut validation = base_validation(policy);
    validation.validate_exp = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(policy.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .ok()
}
