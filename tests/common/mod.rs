#![allow(dead_code)]

use std::sync::Arc;

use argon2::Params;
use authgate::auth::Argon2Encoder;
use authgate::config::{AuthConfig, CorsConfig, DatabaseBackend, DatabaseConfig, ServerConfig};
use authgate::db::MemoryUserStore;
use authgate::{AppState, Settings};

pub const TEST_SECRET: &str = "integration_secret";

pub fn settings() -> Settings {
    Settings {
        environment: "test".to_string(),
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: 1,
        },
        database: DatabaseConfig {
            backend: DatabaseBackend::Memory,
            url: String::new(),
            max_connections: 1,
            acquire_timeout_secs: 1,
        },
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            token_ttl_minutes: 60,
        },
        cors: CorsConfig {
            enabled: false,
            allow_any_origin: false,
            allowed_origins: Vec::new(),
            max_age: 0,
        },
    }
}

pub fn encoder() -> Argon2Encoder {
    Argon2Encoder::with_params(Params::new(1024, 1, 1, None).unwrap())
}

/// App state over an empty in-memory store, with cheap hashing parameters.
pub fn state() -> (AppState, MemoryUserStore) {
    let store = MemoryUserStore::new();
    let state = AppState::with_repository(settings(), Arc::new(store.clone()), Arc::new(encoder()));
    (state, store)
}

/// Full application: bearer middleware in front of every route.
#[allow(unused_macros)]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap($state.auth_middleware())
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure(authgate::configure),
        )
        .await
    };
}
