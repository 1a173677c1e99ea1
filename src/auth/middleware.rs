use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::gate;
use crate::auth::token::verify_access_token;
use crate::config::AuthPolicy;
use crate::error::AppError;

/// Bearer-token middleware.
///
/// Verifies the access token, inserts the claims into request extensions
/// for extractors, and enforces the declarative route→role table from
/// `auth::gate` in one place instead of per handler.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Skip authentication for health check and the account endpoints
        let path = req.path();
        if path == "/health" || path.starts_with("/api/account/") {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let policy = match req.app_data::<web::Data<AuthPolicy>>() {
            Some(policy) => policy.get_ref().clone(),
            None => {
                let app_err =
                    AppError::InternalServerError("Auth policy not configured".to_string());
                return Box::pin(async move { Err(app_err.into()) });
            }
        };

        let auth_header = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let token = match auth_header {
            Some(token) => token,
            None => {
                let app_err = AppError::Unauthorized("Missing token".into());
                return Box::pin(async move { Err(app_err.into()) });
            }
        };

        let claims = match verify_access_token(token, &policy) {
            Ok(claims) => claims,
            Err(app_err) => {
                return Box::pin(async move { Err(app_err.into()) });
            }
        };

        // Route-level role gate, one table for the whole surface.
        if let Some(role) = gate::required_role(req.path()) {
            if !claims.has_role(role) {
                let app_err = AppError::Forbidden(format!("{} role required", role));
                return Box::pin(async move { Err(app_err.into()) });
            }
        }

        req.extensions_mut().insert(claims);
        let fut = self.service.call(req);
        Box::pin(fut)
    }
}
