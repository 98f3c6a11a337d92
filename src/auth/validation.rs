use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::sync::OnceLock;

/// Body of both `/auth/login` and `/auth/register`.
#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

// Keeps the password out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$")
            .unwrap_or_else(|e| panic!("email pattern is a valid regex: {e}"))
    })
}

impl Credentials {
    /// Returns every shape problem with the input; empty means proceed.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let email = self.email.trim();

        if email.is_empty() {
            errors.push(FieldError { field: "email", message: "Email should not be empty" });
        } else if !email_pattern().is_match(email) {
            errors.push(FieldError { field: "email", message: "The email must be a valid email address" });
        }

        if self.password.is_empty() {
            errors.push(FieldError { field: "password", message: "Password should not be empty" });
        }

        errors
    }

    /// Trimmed, lowercased email used as the storage key.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}
