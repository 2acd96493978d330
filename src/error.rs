//! Error types for the Rostrum gateway

use thiserror::Error;

/// Result type alias for Rostrum operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Rostrum gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Input validation error
    #[error("validation error: {0}")]
    Validation(String),

    /// Conversational model error
    #[error("model error: {0}")]
    Model(#[from] crate::model::ModelError),

    /// Speech synthesis error
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
