//! Conversational model collaborators
//!
//! The gateway never generates text itself; it delegates to an external
//! model behind the [`ChatModel`] trait so tests can substitute a fake.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::session::Turn;

/// Errors surfaced by a model collaborator
#[derive(Debug, Error)]
pub enum ModelError {
    /// The call exceeded its bounded timeout
    #[error("model call timed out")]
    Timeout,

    /// The model API answered with a non-success status
    #[error("model API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never completed (DNS, connect, TLS, broken stream)
    #[error("transport failure: {0}")]
    Transport(String),

    /// The API answered but the body was not usable
    #[error("malformed model response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Stable error-kind label used in user-facing error text and logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "TimeoutError",
            Self::Api { .. } => "ApiError",
            Self::Transport(_) => "TransportError",
            Self::InvalidResponse(_) => "InvalidResponseError",
        }
    }

    /// Whether a retry could plausibly succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) => false,
        }
    }
}

/// A conversational model that generates the next assistant reply
///
/// Receives the full ordered history, system and seed turns included, and
/// returns raw (uncleaned) reply text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, history: &[Turn]) -> Result<String, ModelError>;
}
