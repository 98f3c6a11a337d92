//! Bearer token middleware.
//!
//! Runs in front of every route. A request without an `Authorization` header
//! passes through anonymously; a request with one must carry a verifiable
//! bearer token or it is answered here and never reaches the handler.
//! Routes that require a caller extract [`AuthenticatedUser`].

use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use actix_web::{Error, HttpMessage};
use futures::future::{ready, LocalBoxFuture, Ready};
use tracing::{debug, warn};

use crate::auth::context::AuthenticatedUser;
use crate::auth::token::TokenCodec;
use crate::db::operations::UserRepository;
use crate::error::{AppError, AuthError};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, PartialEq, Eq)]
enum BearerHeader {
    Absent,
    Malformed,
    Token(String),
}

fn bearer_token(headers: &HeaderMap) -> BearerHeader {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return BearerHeader::Absent;
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim);

    match token {
        Some(token) if !token.is_empty() => BearerHeader::Token(token.to_string()),
        _ => BearerHeader::Malformed,
    }
}

/// Verifies the token and resolves its owner. Every failure, storage
/// included, collapses into `TokenInvalid`.
async fn authenticate(
    token: &str,
    tokens: &TokenCodec,
    users: &dyn UserRepository,
) -> Result<AuthenticatedUser, AuthError> {
    let email = tokens.decode_email(token)?;
    let user_id = tokens.decode_user_id(token)?;

    let user = match users.find_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!(user_id, "Token owner no longer exists");
            return Err(AuthError::TokenInvalid);
        }
        Err(e) => {
            warn!(user_id, "User lookup failed during token check: {}", e);
            return Err(AuthError::TokenInvalid);
        }
    };

    Ok(AuthenticatedUser::new(user, user_id))
}

/// Middleware factory; register with `App::wrap`.
#[derive(Clone)]
pub struct JwtAuth {
    tokens: Arc<TokenCodec>,
    users: Arc<dyn UserRepository>,
}

impl JwtAuth {
    pub fn new(tokens: Arc<TokenCodec>, users: Arc<dyn UserRepository>) -> Self {
        Self { tokens, users }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            tokens: Arc::clone(&self.tokens),
            users: Arc::clone(&self.users),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    tokens: Arc<TokenCodec>,
    users: Arc<dyn UserRepository>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let tokens = Arc::clone(&self.tokens);
        let users = Arc::clone(&self.users);

        Box::pin(async move {
            let token = match bearer_token(req.headers()) {
                BearerHeader::Absent => {
                    return service.call(req).await.map(ServiceResponse::map_into_left_body);
                }
                BearerHeader::Malformed => {
                    debug!(path = %req.path(), "Rejecting malformed Authorization header");
                    return Ok(reject(req, AuthError::TokenMalformed));
                }
                BearerHeader::Token(token) => token,
            };

            let identity = match authenticate(&token, &tokens, users.as_ref()).await {
                Ok(identity) => identity,
                Err(e) => {
                    debug!(path = %req.path(), "Rejecting bearer token");
                    return Ok(reject(req, e));
                }
            };

            // A re-entered chain keeps the identity bound first.
            let already_bound = req.extensions().contains::<AuthenticatedUser>();
            if !already_bound {
                req.extensions_mut().insert(identity);
            }

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

fn reject<B>(req: ServiceRequest, err: AuthError) -> ServiceResponse<EitherBody<B>> {
    req.error_response(AppError::from(err)).map_into_right_body()
}
