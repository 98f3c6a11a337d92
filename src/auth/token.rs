use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// Marks a token as carrying user details.
pub const TOKEN_SUBJECT: &str = "User details";
/// Identifies this service as the token issuer.
pub const TOKEN_ISSUER: &str = "authgate";
pub const DEFAULT_TTL_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub email: String,
    pub user_id: i64, // JSON integer, never coerced through f64
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
///
/// Stateless apart from the signing key, so one instance is shared by every
/// request.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.sub = Some(TOKEN_SUBJECT.to_string());
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // Expiry is checked against a single clock read in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, email: &str, user_id: i64) -> Result<String, AuthError> {
        self.issue_at(email, user_id, Utc::now().timestamp())
    }

    pub(crate) fn issue_at(&self, email: &str, user_id: i64, now: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: TOKEN_SUBJECT.to_string(),
            iss: TOKEN_ISSUER.to_string(),
            email: email.to_string(),
            user_id,
            iat: now,
            exp: now + self.ttl.num_seconds(),
        };

        // Signing only fails on key/algorithm mismatch, which HS256 + secret rules out.
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            debug!("Token signing failed: {}", e);
            AuthError::TokenInvalid
        })
    }

    /// Verifies the token and returns the email claim.
    pub fn decode_email(&self, token: &str) -> Result<String, AuthError> {
        self.verify(token).map(|claims| claims.email)
    }

    /// Verifies the token and returns the user id claim.
    pub fn decode_user_id(&self, token: &str) -> Result<i64, AuthError> {
        self.verify(token).map(|claims| claims.user_id)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Signature, subject and issuer are checked by `decode` before any claim
    /// is read; the token is live only while `now < exp`.
    pub(crate) fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token rejected: {:?}", e.kind());
            AuthError::TokenInvalid
        })?;

        if now >= data.claims.exp {
            debug!("Token rejected: expired at {}", data.claims.exp);
            return Err(AuthError::TokenInvalid);
        }

        Ok(data.claims)
    }
}
