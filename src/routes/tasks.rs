use crate::{
    auth::gate::{decide, Decision},
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskInput},
    pagination::{Page, PageLimits, PageParams, PAGINATION_HEADER},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str = "id, title, description, status, due_date, created_at, updated_at, user_id";

/// Retrieves the authenticated user's tasks, paginated.
///
/// Results are scoped to the caller by the query itself rather than checked
/// post-hoc, ordered by primary key so paging stays deterministic under
/// concurrent inserts. Paging metadata is echoed in the `X-Pagination`
/// response header.
///
/// ## Query Parameters:
/// - `pageNumber` (optional): 1-based page to fetch, default 1.
/// - `pageSize` (optional): rows per page, default 10, max 100.
///
/// ## Responses:
/// - `200 OK`: a page of the caller's `Task` objects.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[get("")]
pub async fn my_tasks(
    pool: web::Data<PgPool>,
    limits: web::Data<PageLimits>,
    params: web::Query<PageParams>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let request = params.normalize(**limits);

    let total_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&**pool)
            .await?;

    let items = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1
         ORDER BY id ASC LIMIT $2 OFFSET $3"
    ))
    .bind(user.id)
    .bind(request.limit())
    .bind(request.offset())
    .fetch_all(&**pool)
    .await?;

    let page = Page::assemble(items, request, total_count);

    Ok(HttpResponse::Ok()
        .insert_header((PAGINATION_HEADER, page.metadata_header()))
        .json(page))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// A JSON object matching the `TaskInput` struct, including:
/// - `title`: The title of the task (required, 1-200 characters).
/// - `description` (optional): A description of the task.
/// - `status`: One of "pending", "in_progress", "done".
/// - `due_date` (optional): The due date for the task.
///
/// ## Responses:
/// - `201 Created`: Returns the new `Task` with a `Location` header.
/// - `400 Bad Request`: If input validation fails.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    // Validate input
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), user.id);

    let result = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, title, description, status, due_date, user_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(task.id)
    .bind(task.title)
    .bind(task.description)
    .bind(task.status)
    .bind(task.due_date)
    .bind(task.user_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created()
        .insert_header(("Location", format!("/api/tasks/{}", result.id)))
        .json(result))
}

/// Retrieves a specific task by its ID.
///
/// The caller must own the task or hold the admin role. A task that exists
/// but belongs to someone else yields the same 404 as a missing one.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_uuid = task_id.into_inner();

    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
    ))
    .bind(task_uuid)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) => match decide(&user.roles, user.id, task.user_id) {
            Decision::Allow => Ok(HttpResponse::Ok().json(task)),
            Decision::Deny => Err(AppError::NotFound("Task not found".into())),
        },
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Updates an existing task.
///
/// Owner or admin only; the ownership check happens before the write and a
/// denial is indistinguishable from a missing task.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task_uuid = task_id.into_inner();

    // First, resolve the owner
    let ownership = sqlx::query_scalar::<_, i32>("SELECT user_id FROM tasks WHERE id = $1")
        .bind(task_uuid)
        .fetch_optional(&**pool)
        .await?;

    let owner_id = ownership.ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    if decide(&user.roles, user.id, owner_id) == Decision::Deny {
        return Err(AppError::NotFound("Task not found".into()));
    }

    let result = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = $1, description = $2, status = $3, due_date = $4, updated_at = NOW()
         WHERE id = $5
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(&task_data.title)
    .bind(&task_data.description)
    .bind(&task_data.status)
    .bind(task_data.due_date)
    .bind(task_uuid)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Deletes a task by its ID.
///
/// Owner or admin only; same 404 policy as the other single-task routes.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_uuid = task_id.into_inner();

    let ownership = sqlx::query_scalar::<_, i32>("SELECT user_id FROM tasks WHERE id = $1")
        .bind(task_uuid)
        .fetch_optional(&**pool)
        .await?;

    let owner_id = ownership.ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    if decide(&user.roles, user.id, owner_id) == Decision::Deny {
        return Err(AppError::NotFound("Task not found".into()));
    }

    sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(task_uuid)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted" })))
}
