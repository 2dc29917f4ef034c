//! Canvass Server - Interview Form Platform Backend
//!
//! A standalone Rust backend server for the Canvass platform, providing:
//! - RESTful HTTP API via axum
//! - SQLite persistence with rusqlite (via canvass-core)
//! - Interview-workflow provisioning against an n8n-compatible automation
//!   engine
//!
//! This crate can be used standalone (see `canvass-cli`) or embedded in
//! other applications.

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use canvass_core::auth;
use canvass_core::db::Database;
use canvass_core::engine::EngineConfig;
use canvass_core::state::{AppState, AppStateInner};

/// Configuration for the Canvass backend server.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3310,
            db_path: "canvass.db".to_string(),
        }
    }
}

/// Create a shared `AppState` from a database path, reading engine and auth
/// configuration from the environment.
///
/// This is useful when you need to share the state between the HTTP server
/// and other consumers (e.g. CLI commands).
pub async fn create_app_state(db_path: &str) -> Result<AppState, String> {
    let db = Database::open(db_path).map_err(|e| format!("Failed to open database: {}", e))?;

    let state: AppState = Arc::new(AppStateInner::new(
        db,
        EngineConfig::from_env(),
        auth::from_env(),
    ));

    Ok(state)
}

/// Start the embedded Rust backend server.
///
/// Returns the actual address the server is listening on.
pub async fn start_server(config: ServerConfig) -> Result<SocketAddr, String> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canvass_server=info,tower_http=info".into()),
        )
        .init();

    tracing::info!(
        "Starting Canvass backend server on {}:{}",
        config.host,
        config.port
    );

    let state = create_app_state(&config.db_path).await?;

    start_server_with_state(config, state).await
}

/// Start the HTTP server with a pre-built `AppState`.
pub async fn start_server_with_state(
    config: ServerConfig,
    state: AppState,
) -> Result<SocketAddr, String> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(api::api_router())
        .route("/api/health", axum::routing::get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local address: {}", e))?;

    tracing::info!("Canvass backend server listening on {}", local_addr);

    // Spawn the server in a background task
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(local_addr)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "server": "canvass-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
