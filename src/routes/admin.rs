//! Admin-only surface. The `admin` role requirement for everything under
//! `/api/admin` is enforced by the auth middleware via the route table in
//! `auth::gate`, so these handlers carry no role checks of their own.

use crate::{
    error::AppError,
    identity,
    models::{TaskWithOwner, User},
    pagination::{Page, PageLimits, PageParams, PAGINATION_HEADER},
};
use actix_web::{delete, get, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

/// Lists every task in the system, paginated, with the owner's username
/// attached to each row.
#[get("/tasks")]
pub async fn all_tasks(
    pool: web::Data<PgPool>,
    limits: web::Data<PageLimits>,
    params: web::Query<PageParams>,
) -> Result<impl Responder, AppError> {
    let request = params.normalize(**limits);

    let total_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks")
        .fetch_one(&**pool)
        .await?;

    let items = sqlx::query_as::<_, TaskWithOwner>(
        "SELECT t.id, t.title, t.description, t.status, t.due_date,
                t.created_at, t.updated_at, t.user_id, u.username
         FROM tasks t
         JOIN users u ON u.id = t.user_id
         ORDER BY t.id ASC LIMIT $1 OFFSET $2",
    )
    .bind(request.limit())
    .bind(request.offset())
    .fetch_all(&**pool)
    .await?;

    let page = Page::assemble(items, request, total_count);

    Ok(HttpResponse::Ok()
        .insert_header((PAGINATION_HEADER, page.metadata_header()))
        .json(page))
}

/// Lists every user, paginated.
#[get("/users")]
pub async fn all_users(
    pool: web::Data<PgPool>,
    limits: web::Data<PageLimits>,
    params: web::Query<PageParams>,
) -> Result<impl Responder, AppError> {
    let request = params.normalize(**limits);

    let total_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(&**pool)
        .await?;

    let items = sqlx::query_as::<_, User>(
        "SELECT id, username, email, phone, country, image_url, roles, created_at
         FROM users ORDER BY id ASC LIMIT $1 OFFSET $2",
    )
    .bind(request.limit())
    .bind(request.offset())
    .fetch_all(&**pool)
    .await?;

    let page = Page::assemble(items, request, total_count);

    Ok(HttpResponse::Ok()
        .insert_header((PAGINATION_HEADER, page.metadata_header()))
        .json(page))
}

/// Deletes any user by id.
#[delete("/users/{user_id}")]
pub async fn delete_user(
    pool: web::Data<PgPool>,
    user_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let target = user_id.into_inner();
    identity::delete_user(&pool, target).await?;
    log::info!("admin deleted user {}", target);

    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted" })))
}
