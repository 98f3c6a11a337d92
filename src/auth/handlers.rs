use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::context::AuthenticatedUser;
use crate::auth::validation::Credentials;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(rename = "jwtToken")]
    pub jwt_token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub email: String,
}

fn validated(req: &Credentials) -> Result<String, AppError> {
    let errors = req.validate();
    if !errors.is_empty() {
        let fields: Vec<String> = errors.iter().map(ToString::to_string).collect();
        warn!("Validation failed: {}", fields.join("; "));
        return Err(AppError::ValidationFailed);
    }
    Ok(req.normalized_email())
}

pub async fn login(
    req: web::Json<Credentials>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let email = validated(&req)?;
    info!("Received login request for email: {}", email);

    match state.auth_service.login(&email, &req.password).await {
        Ok(jwt_token) => {
            info!("Login successful for email: {}", email);
            Ok(HttpResponse::Ok().json(AuthResponse { jwt_token }))
        }
        Err(e) => {
            warn!("Login failed for email: {}: {}", email, e);
            Err(e)
        }
    }
}

pub async fn register(
    req: web::Json<Credentials>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let email = validated(&req)?;
    info!("Received registration request for email: {}", email);

    match state.auth_service.register(&email, &req.password).await {
        Ok(jwt_token) => {
            info!("Registration successful for email: {}", email);
            Ok(HttpResponse::Ok().json(AuthResponse { jwt_token }))
        }
        Err(e) => {
            warn!("Registration failed for email: {}: {}", email, e);
            Err(e)
        }
    }
}

/// The caller behind the bearer token.
pub async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        id: user.user_id(),
        email: user.email().to_string(),
    })
}

/// Maps unreadable JSON bodies onto the same response as failed validation.
pub fn json_error_handler(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected request body: {}", err);
    AppError::ValidationFailed.into()
}
