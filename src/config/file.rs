//! TOML configuration file loading
//!
//! Supports `~/.config/rostrum/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

use super::TtsBackend;
use crate::coach::cleaner::WhitespacePolicy;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Coaching / turn-processing configuration
    #[serde(default)]
    pub coach: CoachFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Coaching configuration
#[derive(Debug, Default, Deserialize)]
pub struct CoachFileConfig {
    /// Model resource name (e.g. "models/gemini-pro")
    pub model: Option<String>,

    /// Coaching system prompt seeded into every session
    pub system_prompt: Option<String>,

    /// Fixed assistant acknowledgment seeded after the system prompt
    pub greeting: Option<String>,

    /// Maximum cleaned reply length in characters
    pub max_reply_chars: Option<usize>,

    /// Meta-commentary strip patterns (regex, applied case-insensitively)
    pub strip_patterns: Option<Vec<String>>,

    /// Whitespace normalization policy ("blank-lines" or "single-line")
    pub whitespace_policy: Option<WhitespacePolicy>,

    /// Strip characters outside the speakable set
    pub strict_charset: Option<bool>,

    /// Model call timeout in seconds
    pub model_timeout_secs: Option<u64>,

    /// Retry attempts for transient model failures
    pub model_retries: Option<u32>,

    /// Idle session expiry in seconds
    pub session_ttl_secs: Option<u64>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// TTS backend ("openai" or "elevenlabs")
    pub provider: Option<TtsBackend>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,

    /// Target sample rate in Hz
    pub sample_rate: Option<u32>,

    /// Synthesis call timeout in seconds
    pub synthesis_timeout_secs: Option<u64>,

    /// Audio artifact expiry in seconds
    pub audio_ttl_secs: Option<u64>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub gemini: Option<String>,
    pub openai: Option<String>,
    pub elevenlabs: Option<String>,
}
