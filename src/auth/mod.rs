//! Authentication module
//!
//! Token issuance and verification, the per-request bearer middleware,
//! and the login/registration use cases.

pub mod context;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;
pub mod validation;

pub use context::AuthenticatedUser;
pub use middleware::JwtAuth;
pub use password::{Argon2Encoder, PasswordEncoder};
pub use service::AuthService;
pub use token::{Claims, TokenCodec};
pub use validation::Credentials;
