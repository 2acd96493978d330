//! HTTP API server for the Rostrum gateway

pub mod audio;
pub mod chat;
pub mod health;

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::coach::TurnProcessor;
use crate::session::SessionStore;
use crate::voice::{AudioStore, SpeechSynthesizer};
use crate::Result;

/// Shared state for API handlers
pub struct ApiState {
    /// Turn processor; absent when no model credential is configured
    pub processor: Option<Arc<TurnProcessor>>,

    /// Speech synthesizer; absent when no TTS credential is configured
    pub synthesizer: Option<Arc<dyn SpeechSynthesizer>>,

    /// Per-session conversation histories
    pub sessions: SessionStore,

    /// Transient audio artifacts
    pub audio: AudioStore,
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    port: u16,
    processor: Option<Arc<TurnProcessor>>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    sessions: SessionStore,
    audio: AudioStore,
    static_dir: Option<PathBuf>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(sessions: SessionStore, audio: AudioStore, port: u16) -> Self {
        Self {
            port,
            processor: None,
            synthesizer: None,
            sessions,
            audio,
            static_dir: None,
        }
    }

    /// Set the turn processor
    #[must_use]
    pub fn processor(mut self, processor: Arc<TurnProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }

    /// Set the speech synthesizer
    #[must_use]
    pub fn synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Set the static files directory for serving the web UI
    #[must_use]
    pub fn static_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.static_dir = dir;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let state = Arc::new(ApiState {
            processor: self.processor,
            synthesizer: self.synthesizer,
            sessions: self.sessions,
            audio: self.audio,
        });

        ApiServer {
            state,
            port: self.port,
            static_dir: self.static_dir,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Build the router with all routes
    fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(chat::router(self.state.clone()))
            .merge(audio::router(self.state.clone()))
            .merge(health::router())
            .merge(health::ready_router(self.state.clone()));

        // Serve static files if configured
        if let Some(static_dir) = &self.static_dir {
            let index_file = static_dir.join("index.html");
            let serve_dir = ServeDir::new(static_dir).not_found_service(ServeFile::new(&index_file));

            router = router.fallback_service(serve_dir);
            tracing::info!(path = %static_dir.display(), "serving static files");
        }

        // CORS layer for cross-origin requests from frontend
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router.layer(cors).layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }

    /// Run the API server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}
