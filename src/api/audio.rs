//! Audio artifact retrieval endpoint

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::ApiState;

/// Build audio router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/audio/{filename}", get(serve_audio))
        .with_state(state)
}

/// Serve a previously synthesized artifact as MP3
///
/// Artifacts can be fetched any number of times until their TTL expires.
async fn serve_audio(
    State(state): State<Arc<ApiState>>,
    Path(filename): Path<String>,
) -> Response {
    #[derive(Serialize)]
    struct ErrorResponse {
        error: ErrorBody,
    }

    #[derive(Serialize)]
    struct ErrorBody {
        code: &'static str,
        message: &'static str,
    }

    match state.audio.get(&filename).await {
        Some(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "audio/mpeg")],
            bytes.to_vec(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: ErrorBody {
                    code: "not_found",
                    message: "unknown or expired audio artifact",
                },
            }),
        )
            .into_response(),
    }
}
