mod config;
mod error;
mod handlers;
mod provider;
mod relay;
mod routes;
mod scratch;
mod state;
mod types;

use anyhow::Result;
use axum::http::HeaderValue;
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "voice_agent_backend=debug,tower_http=debug".to_string()),
        )
        .init();

    // Load configuration - first readable path wins, defaults otherwise
    let config_paths: Vec<String> = vec![
        std::env::var("CONFIG_PATH").ok(),
        Some("conf.yaml".to_string()),
        Some("backend/conf.yaml".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut config = None;
    for path in &config_paths {
        match Config::load(path) {
            Ok(cfg) => {
                info!("Loaded configuration from: {}", path);
                config = Some(cfg);
                break;
            }
            Err(e) => {
                tracing::debug!("Failed to load config from {}: {}", path, e);
            }
        }
    }

    let config = config.unwrap_or_else(|| {
        info!("No config file found, using defaults");
        let mut cfg = Config::default();
        cfg.apply_env();
        cfg
    });

    if config.provider_config.api_key.is_empty() {
        warn!("No provider API key configured; set GROQ_API_KEY");
    }

    let app_state = AppState::new(&config)?;

    let cors = build_cors(&config.system_config.allowed_origins);
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr: SocketAddr = format!(
        "{}:{}",
        config.system_config.host, config.system_config.port
    )
    .parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
