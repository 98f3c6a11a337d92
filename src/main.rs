use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use authgate::config::CorsConfig;
use authgate::{configure, AppState, Settings};
use dotenv::dotenv;
use std::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn cors_layer(config: &CorsConfig) -> Cors {
    if !config.enabled {
        // Same-origin only
        return Cors::default();
    }

    let cors = if config.allow_any_origin {
        Cors::default().allow_any_origin()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec!["Authorization", "Content-Type"])
        .max_age(config.max_age as usize)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let config = Settings::new().context("Failed to load configuration")?;
    info!("Configuration loaded successfully ({})", config.environment);

    let state = AppState::new(config.clone())
        .await
        .context("Failed to initialize application state")?;
    let data = web::Data::new(state.clone());

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?;
    info!("Listening on {}:{}", config.server.host, config.server.port);

    let cors_config = config.cors.clone();
    let app_data = data.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(state.auth_middleware())
            .wrap(cors_layer(&cors_config))
            .app_data(app_data.clone())
            .configure(configure)
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    data.shutdown().await?;
    info!("Server stopped");
    Ok(())
}
