//! HTTP service: upload endpoints plus the chart files they point at.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::AppError;

pub mod handlers;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let config = &state.config;
    let charts = ServeDir::new(&config.report.output_dir);

    Router::new()
        .route("/api/investor_analysis", post(handlers::investor_analysis))
        .route(
            "/api/sales_forecast",
            get(handlers::sales_forecast_usage).post(handlers::sales_forecast),
        )
        .route("/api/analyze", post(handlers::combined_analysis))
        .route("/health", get(handlers::health))
        .nest_service(&config.report.url_prefix, charts)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ServerConfig) -> Result<(), AppError> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    tokio::fs::create_dir_all(&config.report.output_dir).await?;

    let addr = config.bind;
    info!(
        upload_dir = %config.upload_dir.display(),
        output_dir = %config.report.output_dir.display(),
        url_prefix = %config.report.url_prefix,
        policy = ?config.ingest.revenue_policy,
        "starting server"
    );
    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Server(format!("failed to bind {addr}: {e}")))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}
