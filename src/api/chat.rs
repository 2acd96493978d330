//! Conversational turn endpoint

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::ApiState;

/// Build chat router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .with_state(state)
}

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,

    /// Session to continue; absent or unknown ids start a fresh session
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Chat response body
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub audio_url: String,
    pub session_id: String,
}

/// Process one conversational turn
///
/// Model failures degrade to a spoken error reply inside the turn processor;
/// synthesis failures fail the whole turn with a non-2xx response.
async fn chat(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ChatError> {
    let processor = state
        .processor
        .as_ref()
        .ok_or(ChatError::NotConfigured("chat model not configured"))?;
    let synthesizer = state
        .synthesizer
        .as_ref()
        .ok_or(ChatError::NotConfigured("speech synthesis not configured"))?;

    if request.message.trim().is_empty() {
        return Err(ChatError::BadRequest("Please provide a non-empty message"));
    }

    let (session_id, session) = state
        .sessions
        .get_or_create(request.session_id.as_deref())
        .await;

    // The session lock is held for the whole turn so turns within one
    // session apply in receipt order.
    let reply = {
        let mut session = session.lock().await;
        processor.process_turn(&mut session, &request.message).await
    };

    let audio = synthesizer.synthesize(&reply.text).await.map_err(|e| {
        tracing::error!(error = %e, "speech synthesis failed");
        ChatError::SynthesisFailed(e.to_string())
    })?;

    let filename = state.audio.store(audio).await;

    Ok(Json(ChatResponse {
        response: reply.text,
        audio_url: format!("/audio/{filename}"),
        session_id,
    }))
}

/// Chat API errors
#[derive(Debug)]
pub enum ChatError {
    NotConfigured(&'static str),
    BadRequest(&'static str),
    SynthesisFailed(String),
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: ErrorBody,
        }

        #[derive(Serialize)]
        struct ErrorBody {
            code: &'static str,
            message: String,
        }

        let (status, code, message) = match self {
            Self::NotConfigured(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "not_configured", msg.to_string())
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.to_string()),
            Self::SynthesisFailed(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "synthesis_failed", msg)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}
