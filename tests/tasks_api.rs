use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use dotenv::dotenv;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use taskvault::auth::{issue_access_token, AuthMiddleware, TokenResponse};
use taskvault::config::AuthPolicy;
use taskvault::pagination::PageLimits;
use taskvault::routes;

fn test_policy() -> AuthPolicy {
    AuthPolicy {
        secret: "integration-test-secret-0123456789abcdef".to_string(),
        issuer: "taskvault".to_string(),
        audience: "taskvault-api".to_string(),
        access_token_minutes: 60,
        refresh_token_days: 7,
    }
}

fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/taskvault_offline")
        .expect("valid pool options")
}

macro_rules! spawn_app {
    ($pool:expr, $policy:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool))
                .app_data(web::Data::new($policy))
                .app_data(web::Data::new(PageLimits::default()))
                .service(routes::health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

macro_rules! register_and_login {
    ($app:expr, $username:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/account/register")
            .set_json(json!({
                "username": $username,
                "email": format!("{}@example.com", $username),
                "password": $password,
                "country": "Norway"
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED, "registration failed");

        let req = test::TestRequest::post()
            .uri("/api/account/login")
            .set_json(json!({ "username": $username, "password": $password }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "login failed");
        let tokens: TokenResponse = test::read_body_json(resp).await;
        tokens
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

#[actix_rt::test]
async fn test_create_task_rejects_invalid_input_before_touching_storage() {
    let app = spawn_app!(lazy_pool(), test_policy());

    let (token, _) =
        issue_access_token(1, "alice", None, vec!["user".into()], &test_policy()).unwrap();

    // Empty title fails validation; the lazy pool proves no query ran.
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(bearer(&token))
        .set_json(json!({ "title": "", "status": "pending" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown status values are rejected at deserialization.
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(bearer(&token))
        .set_json(json!({ "title": "A", "status": "someday" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_client_error());
}

// Requires a live PostgreSQL with the migrations applied; run with
// `cargo test -- --ignored` and DATABASE_URL set.
#[ignore]
#[actix_rt::test]
async fn test_ownership_scoping_and_admin_visibility() {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");

    for name in ["scoping_owner", "scoping_other", "scoping_admin"] {
        let _ = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(name)
            .execute(&pool)
            .await;
    }

    let app = spawn_app!(pool.clone(), test_policy());

    let owner = register_and_login!(app, "scoping_owner", "P@ss1234");
    let other = register_and_login!(app, "scoping_other", "P@ss1234");

    // Grant the third user the admin role, then log in so the claims
    // carry it.
    register_and_login!(app, "scoping_admin", "P@ss1234");
    sqlx::query("UPDATE users SET roles = array_append(roles, 'admin') WHERE username = $1")
        .bind("scoping_admin")
        .execute(&pool)
        .await
        .unwrap();
    let req = test::TestRequest::post()
        .uri("/api/account/login")
        .set_json(json!({ "username": "scoping_admin", "password": "P@ss1234" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let admin: TokenResponse = test::read_body_json(resp).await;

    // Owner creates a task
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(bearer(&owner.token))
        .set_json(json!({ "title": "A", "status": "pending" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key("Location"));
    let created: serde_json::Value = test::read_body_json(resp).await;
    let task_id = created["id"].as_str().unwrap().to_string();

    // Another non-admin user does not see it in their listing
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header(bearer(&other.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: serde_json::Value = test::read_body_json(resp).await;
    let titles: Vec<_> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap().to_string())
        .collect();
    assert!(!titles.contains(&"A".to_string()));

    // Nor can they read, update, or delete it; the denial is a plain 404
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(bearer(&other.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(bearer(&other.token))
        .set_json(json!({ "title": "hijacked", "status": "done" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(bearer(&other.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The admin listing shows the task with the owner's username attached
    let req = test::TestRequest::get()
        .uri("/api/admin/tasks?pageSize=100")
        .append_header(bearer(&admin.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: serde_json::Value = test::read_body_json(resp).await;
    let row = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["id"].as_str() == Some(task_id.as_str()))
        .expect("admin listing should include the task");
    assert_eq!(row["username"], "scoping_owner");

    // And the admin can read and modify the resource directly
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header(bearer(&admin.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    for name in ["scoping_owner", "scoping_other", "scoping_admin"] {
        let _ = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(name)
            .execute(&pool)
            .await;
    }
}

// Requires a live PostgreSQL with the migrations applied.
#[ignore]
#[actix_rt::test]
async fn test_pagination_over_tasks() {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");

    let _ = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind("paging_user")
        .execute(&pool)
        .await;

    let app = spawn_app!(pool.clone(), test_policy());
    let session = register_and_login!(app, "paging_user", "P@ss1234");

    for i in 0..25 {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .append_header(bearer(&session.token))
            .set_json(json!({ "title": format!("task {:02}", i), "status": "pending" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // Page 3 of 10 holds the 5-row tail
    let req = test::TestRequest::get()
        .uri("/api/tasks?pageNumber=3&pageSize=10")
        .append_header(bearer(&session.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let header = resp
        .headers()
        .get("X-Pagination")
        .expect("X-Pagination header")
        .to_str()
        .unwrap()
        .to_string();
    let meta: serde_json::Value = serde_json::from_str(&header).unwrap();
    assert_eq!(meta["totalCount"], 25);
    assert_eq!(meta["totalPages"], 3);
    assert_eq!(meta["currentPage"], 3);

    let page: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 5);
    assert_eq!(page["totalPages"], 3);

    // A page past the end is empty but still described
    let req = test::TestRequest::get()
        .uri("/api/tasks?pageNumber=9&pageSize=10")
        .append_header(bearer(&session.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 0);
    assert_eq!(page["totalCount"], 25);
    assert_eq!(page["currentPage"], 9);

    // Two fetches of the same page agree: paging is keyed on the primary key
    let fetch_page_one = || async {
        let req = test::TestRequest::get()
            .uri("/api/tasks?pageNumber=1&pageSize=10")
            .append_header(bearer(&session.token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let page: serde_json::Value = test::read_body_json(resp).await;
        page["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(fetch_page_one().await, fetch_page_one().await);

    let _ = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind("paging_user")
        .execute(&pool)
        .await;
}

// Requires a live PostgreSQL with the migrations applied.
#[ignore]
#[actix_rt::test]
async fn test_admin_delete_cascades() {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");

    for name in ["cascade_victim", "cascade_admin"] {
        let _ = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(name)
            .execute(&pool)
            .await;
    }

    let app = spawn_app!(pool.clone(), test_policy());

    let victim = register_and_login!(app, "cascade_victim", "P@ss1234");
    register_and_login!(app, "cascade_admin", "P@ss1234");
    sqlx::query("UPDATE users SET roles = array_append(roles, 'admin') WHERE username = $1")
        .bind("cascade_admin")
        .execute(&pool)
        .await
        .unwrap();
    let req = test::TestRequest::post()
        .uri("/api/account/login")
        .set_json(json!({ "username": "cascade_admin", "password": "P@ss1234" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let admin: TokenResponse = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header(bearer(&victim.token))
        .set_json(json!({ "title": "doomed", "status": "pending" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let victim_id: i32 = sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
        .bind("cascade_victim")
        .fetch_one(&pool)
        .await
        .unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/users/{}", victim_id))
        .append_header(bearer(&admin.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Tasks and the refresh-token slot go with the user
    let tasks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
        .bind(victim_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(tasks, 0);
    let tokens: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM refresh_tokens WHERE user_id = $1")
        .bind(victim_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(tokens, 0);

    let _ = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind("cascade_admin")
        .execute(&pool)
        .await;
}
