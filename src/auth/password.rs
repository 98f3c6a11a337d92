use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;

use crate::error::AppError;

/// One-way password hashing used by login and registration.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordEncoder: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, AppError>;

    /// Constant-time comparison of `plaintext` against a stored hash.
    fn matches(&self, plaintext: &str, stored_hash: &str) -> bool;
}

/// Argon2id with default parameters, hashes stored as PHC strings.
#[derive(Default)]
pub struct Argon2Encoder {
    argon2: Argon2<'static>,
}

impl Argon2Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Argon2id with explicit cost parameters.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl PasswordEncoder for Argon2Encoder {
    fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AppError::InternalError(format!("password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    fn matches(&self, plaintext: &str, stored_hash: &str) -> bool {
        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self.argon2.verify_password(plaintext.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }
}
