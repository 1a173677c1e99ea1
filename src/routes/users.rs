use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    identity,
    models::{UpdateProfileRequest, User},
};
use actix_web::{delete, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Updates the authenticated user's profile.
///
/// Only the provided fields change; username and password are not editable
/// through this route.
#[put("/me")]
pub async fn update_profile(
    pool: web::Data<PgPool>,
    profile: web::Json<UpdateProfileRequest>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    profile.validate()?;

    let updated = sqlx::query_as::<_, User>(
        "UPDATE users
         SET email = COALESCE($2, email),
             phone = COALESCE($3, phone),
             country = COALESCE($4, country),
             image_url = COALESCE($5, image_url)
         WHERE id = $1
         RETURNING id, username, email, phone, country, image_url, roles, created_at",
    )
    .bind(user.id)
    .bind(&profile.email)
    .bind(&profile.phone)
    .bind(&profile.country)
    .bind(&profile.image_url)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes the authenticated user's own account.
///
/// Tasks and the stored refresh token cascade with the user row.
#[delete("/me")]
pub async fn delete_account(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    identity::delete_user(&pool, user.id).await?;
    log::info!("user {} deleted their account", user.id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Account deleted" })))
}
