//! HTTP boundary for the detection pipeline.
//!
//! Exposes the single detection operation and a health check:
//!
//! - `POST /api/plant/detect` — multipart upload field `image`; returns the
//!   flat diagnosis record, or `{"error": ...}` with a 400 for
//!   user-correctable failures and a 500 for internal faults.
//! - `GET /api/health` — liveness, uptime, and version.
//!
//! The pipeline itself is synchronous; handlers run it on the blocking
//! thread pool so inference latency never stalls the async runtime.

pub mod routes;
pub mod state;

pub use routes::{ApiError, HealthResponse};
pub use state::{AppState, SharedState};

use crate::pipeline::DiseaseDetector;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Builds the application router around a detector.
pub fn router(detector: Arc<DiseaseDetector>) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/plant/detect", post(routes::detect))
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(detector))
}

/// Binds `addr` and serves the detection API until the task is stopped.
pub async fn serve(addr: SocketAddr, detector: Arc<DiseaseDetector>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "serving plant disease detection API");
    axum::serve(listener, router(detector)).await
}
