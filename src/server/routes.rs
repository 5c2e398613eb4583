//! HTTP route handlers.

use crate::core::errors::DetectError;
use crate::domain::diagnosis::Diagnosis;
use crate::server::state::SharedState;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// Response body for `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub classes: usize,
}

/// GET /api/health - Health check endpoint.
///
/// Reachable only when the full artifact set loaded at startup; a missing
/// artifact fails detector construction and the process never starts
/// serving.
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        classes: state.detector.num_classes(),
    })
}

/// POST /api/plant/detect - Run the detection pipeline on an uploaded
/// image.
///
/// Expects a multipart body with an `image` field. The upload is decoded
/// in memory; nothing is written to disk.
pub async fn detect(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<Diagnosis>, ApiError> {
    let mut image_bytes = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            image_bytes = Some(field.bytes().await?);
            break;
        }
    }

    let Some(bytes) = image_bytes else {
        return Err(ApiError::bad_request("No image uploaded"));
    };

    let detector = state.detector.clone();
    let diagnosis = tokio::task::spawn_blocking(move || detector.detect_bytes(&bytes))
        .await
        .map_err(|e| {
            error!(error = %e, "detection task panicked");
            ApiError::internal()
        })??;

    Ok(Json(diagnosis))
}

/// An HTTP-mapped pipeline error: status code plus the message exposed to
/// the caller.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }

    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Plant disease detection failed".to_string(),
        }
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The message exposed to the caller.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DetectError> for ApiError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::InvalidImage(_) => Self::bad_request("Invalid image"),
            DetectError::LowConfidence { .. } => Self::bad_request("Leaf not detected clearly"),
            DetectError::KnowledgeNotFound { ref class } => {
                // Internal consistency fault between trained artifacts and
                // the knowledge base; details stay server-side.
                error!(class = %class, "knowledge base lookup failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Internal data inconsistency".to_string(),
                }
            }
            other => {
                error!(error = %other, "detection pipeline error");
                Self::internal()
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request(&format!("Malformed upload: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}
