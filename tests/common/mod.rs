//! Shared test helpers: fake collaborators and router construction

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;

use rostrum::api::{audio, chat, health, ApiState};
use rostrum::coach::TurnProcessor;
use rostrum::config::CoachConfig;
use rostrum::model::{ChatModel, ModelError};
use rostrum::session::{SessionStore, Turn};
use rostrum::voice::{AudioStore, SpeechSynthesizer};
use rostrum::{Error, Result};

/// MP3-ish bytes returned by the fake synthesizer
pub const FAKE_AUDIO: &[u8] = b"ID3fake-mp3-bytes";

/// Fake model returning a fixed reply, recording the history length it saw
/// on each call
pub struct FakeModel {
    reply: String,
    pub seen_history_lens: Mutex<Vec<usize>>,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            seen_history_lens: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn generate(&self, history: &[Turn]) -> std::result::Result<String, ModelError> {
        self.seen_history_lens.lock().unwrap().push(history.len());
        Ok(self.reply.clone())
    }
}

/// Fake model that always times out
pub struct TimeoutModel;

#[async_trait]
impl ChatModel for TimeoutModel {
    async fn generate(&self, _history: &[Turn]) -> std::result::Result<String, ModelError> {
        Err(ModelError::Timeout)
    }
}

/// Fake synthesizer returning canned bytes, or failing on demand
pub struct FakeSynthesizer {
    pub fail: bool,
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>> {
        if self.fail {
            Err(Error::Synthesis("fake synthesizer told to fail".to_string()))
        } else {
            Ok(FAKE_AUDIO.to_vec())
        }
    }
}

/// Coach configuration used across router tests: no retries, small cap
pub fn test_coach_config() -> CoachConfig {
    CoachConfig {
        model_retries: 0,
        ..CoachConfig::default()
    }
}

/// Build a test API router around the given collaborators
pub fn build_test_router(
    model: Option<Arc<dyn ChatModel>>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
) -> Router {
    let config = test_coach_config();
    let sessions = SessionStore::new(
        &config.system_prompt,
        &config.greeting,
        std::time::Duration::from_secs(60),
    );
    let audio_store = AudioStore::new(std::time::Duration::from_secs(60));

    let processor = model
        .map(|m| TurnProcessor::new(m, &config).map(Arc::new))
        .transpose()
        .expect("test coach config is valid");

    let state = Arc::new(ApiState {
        processor,
        synthesizer,
        sessions,
        audio: audio_store,
    });

    Router::new()
        .merge(chat::router(state.clone()))
        .merge(audio::router(state.clone()))
        .merge(health::router())
        .merge(health::ready_router(state))
}
