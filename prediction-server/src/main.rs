//! Insurance Prediction API Server
//!
//! Serves the vehicle insurance purchase classifier over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  INSURANCE PREDICTION API                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌─────────────────────────────────────┐   │
//! │  │  Router   │──▶│  PredictionService                   │   │
//! │  │  (Axum)   │   │  validate → encode → classify        │   │
//! │  └───────────┘   └──────────────────┬──────────────────┘   │
//! │                                     ▼                       │
//! │                          ┌────────────────────┐            │
//! │                          │ ONNX Runtime model │            │
//! │                          └────────────────────┘            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;

#[cfg(test)]
mod tests;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use prediction_core::PredictionService;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::AppResult;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_tracing(config.log_format);

    tracing::info!("Insurance Prediction API starting...");
    tracing::info!(
        environment = %config.environment,
        production = config.is_production(),
        "Model artifact: {}",
        config.model_path.display()
    );

    // Load model (degraded service on failure)
    let service = PredictionService::load(&config.model_path)
        .with_max_batch_size(config.max_batch_size);
    match service.unavailable_reason() {
        Some(reason) => tracing::warn!("Serving in degraded mode: {}", reason),
        None => tracing::info!("Model ready"),
    }

    // Build application state
    let state = AppState {
        service: Arc::new(service),
        config: config.clone(),
    };

    let app = create_router(state);

    // Start server
    let host: IpAddr = config.host.parse()
        .with_context(|| format!("Invalid HOST '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: config::LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "prediction_server=debug,prediction_core=info,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        config::LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        config::LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/model", get(handlers::model::status))
        .route("/predict", post(handlers::predict::single))
        .route("/predict_batch", post(handlers::predict::batch))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
