//! AreaFX Engine - Area effect and aura reconciliation for tabletop scenes
//!
//! The engine keeps actor effects in step with where tokens stand:
//! - Applies effects to tokens inside placed templates and auras
//! - Removes them once the token leaves or the area disappears
//! - Reconciles on demand or whenever the host reports a scene edit

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::refresh_worker::refresh_worker;
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "areafx_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting AreaFX Engine");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!(
        "  Store: {}",
        config.database_url.as_deref().unwrap_or("in-memory")
    );
    let port = config.server_port;

    // Initialize application state
    let (state, refresh_rx) = AppState::new(config).await?;
    let state = Arc::new(state);
    tracing::info!("Application state initialized");
    tracing::debug!("Engine settings: {:?}", state.settings);

    // Scene refresh worker
    let refresh_task = {
        let area_effects = state.area_effects.clone();
        tokio::spawn(async move {
            refresh_worker(area_effects, refresh_rx).await;
        })
    };

    // Build the router
    let app = Router::new()
        .route("/health", get(health_check))
        .merge(http::create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping refresh worker...");
            refresh_task.abort();
            tracing::info!("Refresh worker stopped");
        }
    }

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
