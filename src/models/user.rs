use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Public view of a user; never carries the password hash.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: String,
    pub image_url: Option<String>,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile fields a user may change; everything is optional and unset
/// fields are left untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(min = 2, max = 56))]
    pub country: Option<String>,
    #[serde(default, rename = "imageUrl")]
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
}
