use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::password::PasswordEncoder;
use crate::auth::token::TokenCodec;
use crate::db::operations::UserRepository;
use crate::error::{AppError, AuthError};

/// Login and registration use cases.
///
/// Expects pre-validated, normalized input and holds no state of its own.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    encoder: Arc<dyn PasswordEncoder>,
    tokens: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        encoder: Arc<dyn PasswordEncoder>,
        tokens: Arc<TokenCodec>,
    ) -> Self {
        Self { users, encoder, tokens }
    }

    /// Checks the password against the stored hash and mints a token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        if !self.encoder.matches(password, &user.password_hash) {
            warn!(user_id = user.id, "Password mismatch");
            return Err(AuthError::CredentialMismatch.into());
        }

        let token = self.tokens.issue(&user.email, user.id)?;
        info!(user_id = user.id, "Issued token after login");
        Ok(token)
    }

    /// Creates the user, then re-reads it by email to learn the assigned id.
    pub async fn register(&self, email: &str, password: &str) -> Result<String, AppError> {
        let password_hash = self.encoder.hash(password)?;
        self.users.create(email, &password_hash).await?;

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::PostCreateLookupFailed)?;

        let token = self.tokens.issue(&user.email, user.id)?;
        info!(user_id = user.id, "Issued token after registration");
        Ok(token)
    }
}
