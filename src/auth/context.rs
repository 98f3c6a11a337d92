use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};

use crate::db::models::User;
use crate::error::{AppError, AuthError};

/// Identity bound to a single request after its bearer token verified.
///
/// Inserted once by [`JwtAuth`](crate::auth::JwtAuth) and read-only from then on.
/// Extract it directly to require authentication, or as
/// `Option<AuthenticatedUser>` on routes that also serve anonymous callers.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user: User,
    user_id: i64,
}

impl AuthenticatedUser {
    pub fn new(user: User, user_id: i64) -> Self {
        Self { user, user_id }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// The id carried by the token.
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or(AppError::AuthError(AuthError::Unauthenticated)),
        )
    }
}
