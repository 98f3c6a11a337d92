pub mod auth;
pub mod config;
pub mod db;
pub mod error;

use std::sync::Arc;
use std::time::Duration;
use actix_web::{web, HttpResponse};
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

use auth::{Argon2Encoder, AuthService, JwtAuth, PasswordEncoder, TokenCodec};
use config::DatabaseBackend;
use db::{MemoryUserStore, PgUserStore, UserRepository};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Registers every route. The caller wraps the app in [`AppState::auth_middleware`].
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(auth::handlers::json_error_handler))
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/auth")
                .route("/login", web::post().to(auth::handlers::login))
                .route("/register", web::post().to(auth::handlers::register))
                .route("/me", web::get().to(auth::handlers::me)),
        );
}

/// Collaborators shared by all workers, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<TokenCodec>,
    pub auth_service: Arc<AuthService>,
    pg: Option<Arc<PgUserStore>>,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        match config.database.backend {
            DatabaseBackend::Postgres => {
                let store = PgUserStore::new_with_options(
                    &config.database.url,
                    config.database.max_connections,
                    Duration::from_secs(config.database.acquire_timeout_secs),
                )
                .await?;
                store.migrate().await?;
                info!("Connected to Postgres and applied migrations");

                let store = Arc::new(store);
                let mut state = Self::with_repository(config, store.clone(), Arc::new(Argon2Encoder::new()));
                state.pg = Some(store);
                Ok(state)
            }
            DatabaseBackend::Memory => {
                info!("Using in-memory user store");
                Ok(Self::with_repository(
                    config,
                    Arc::new(MemoryUserStore::new()),
                    Arc::new(Argon2Encoder::new()),
                ))
            }
        }
    }

    pub fn with_repository(
        config: Settings,
        users: Arc<dyn UserRepository>,
        encoder: Arc<dyn PasswordEncoder>,
    ) -> Self {
        let tokens = Arc::new(TokenCodec::new(&config.auth.jwt_secret, config.auth.token_ttl_minutes));
        let auth_service = Arc::new(AuthService::new(users.clone(), encoder, tokens.clone()));

        Self {
            config: Arc::new(config),
            users,
            tokens,
            auth_service,
            pg: None,
        }
    }

    pub fn auth_middleware(&self) -> JwtAuth {
        JwtAuth::new(self.tokens.clone(), self.users.clone())
    }

    pub async fn shutdown(&self) -> Result<()> {
        if let Some(pg) = &self.pg {
            pg.close().await;
        }
        Ok(())
    }
}
