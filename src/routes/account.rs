use crate::{
    auth::{session, LoginRequest, RefreshRequest, RegisterRequest},
    config::AuthPolicy,
    error::AppError,
    identity,
    models::User,
};
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

fn requester_ip(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

/// Register a new user
///
/// Creates a new user account with the base `user` role.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;

    if identity::username_or_email_taken(&pool, &register_data.username, &register_data.email)
        .await?
    {
        return Err(AppError::BadRequest(
            "Username or email already registered".into(),
        ));
    }

    let user = identity::create_user(&pool, &register_data).await?;
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(User::from(user)))
}

/// Login user
///
/// Authenticates a user and returns an access/refresh token pair.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    policy: web::Data<AuthPolicy>,
    login_data: web::Json<LoginRequest>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    let ip = requester_ip(&req);
    let tokens = session::login(&pool, &policy, &login_data, &ip).await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// Exchange an expired access token and a live refresh token for a new pair.
///
/// The presented refresh token is consumed: the stored slot is replaced, so
/// replaying it fails.
#[post("/refresh")]
pub async fn refresh(
    pool: web::Data<PgPool>,
    policy: web::Data<AuthPolicy>,
    refresh_data: web::Json<RefreshRequest>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let ip = requester_ip(&req);
    let tokens = session::refresh(&pool, &policy, &refresh_data, &ip).await?;

    Ok(HttpResponse::Ok().json(tokens))
}
