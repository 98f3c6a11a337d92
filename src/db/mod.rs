//! Database module
//!
//! User storage behind the `UserRepository` trait, with a Postgres
//! implementation and an in-process one for tests and local runs.

pub mod memory;
pub mod models;
pub mod operations;

pub use memory::MemoryUserStore;
pub use models::User;
pub use operations::{PgUserStore, UserRepository};
