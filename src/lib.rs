//! Rostrum - voice-enabled coaching assistant gateway
//!
//! This library provides the core functionality for the Rostrum gateway:
//! - Conversational turn processing against an external LLM
//! - Reply cleaning (markdown strip, meta-commentary strip, length cap)
//! - Speech synthesis delegation and transient audio artifacts
//! - Per-session conversation histories
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP surface                       │
//! │   /api/chat  │  /audio/{file}  │  /health  /ready   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Turn Processor                       │
//! │   Sessions  │  Cleaner  │  Audio store              │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │            External collaborators                    │
//! │   Gemini (chat)  │  OpenAI / ElevenLabs (TTS)       │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod coach;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod voice;

pub use coach::{CoachReply, TurnProcessor, EMPTY_INPUT_REPLY};
pub use config::Config;
pub use error::{Error, Result};
pub use model::{ChatModel, GeminiClient, ModelError};
pub use session::{Role, Session, SessionStore, Turn};
pub use voice::{split_sentences, AudioStore, SpeechSynthesizer, TextToSpeech};
