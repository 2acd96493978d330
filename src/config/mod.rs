//! Configuration management for the Rostrum gateway
//!
//! The configuration is an explicit immutable value built once at startup:
//! defaults, overlaid by an optional TOML file, overlaid by environment
//! variables for credentials.

mod file;

pub use file::ConfigFile;

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::coach::cleaner::{WhitespacePolicy, DEFAULT_STRIP_PATTERNS};
use crate::Result;

/// Default coaching system prompt, seeded as the first turn of every session
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an AI debate coach helping users prepare for debates, interviews, and \
Model United Nations sessions. Cross-question their arguments, point out \
logical fallacies, give feedback on language and delivery, and simulate \
opponents or interviewers when asked. Adapt to the user's skill level and the \
event they are preparing for. Reply in a conversational tone without markdown \
formatting, asterisks, headings, or list markers; your response should be \
fluent and easy to read aloud.";

/// Default assistant acknowledgment, seeded as the second turn
pub const DEFAULT_GREETING: &str = "Understood. I'm ready to help you prepare \
for your debate. What specific topic or aspect would you like to focus on?";

/// Rostrum gateway configuration
#[derive(Debug)]
pub struct Config {
    /// Turn-processing configuration
    pub coach: CoachConfig,

    /// Voice synthesis configuration
    pub voice: VoiceConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// API keys for external services
    pub api_keys: ApiKeys,
}

/// Turn-processing configuration
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Model resource name (e.g. "models/gemini-pro")
    pub model: String,

    /// Coaching system prompt seeded into every session
    pub system_prompt: String,

    /// Fixed assistant acknowledgment seeded after the system prompt
    pub greeting: String,

    /// Maximum cleaned reply length in characters
    pub max_reply_chars: usize,

    /// Meta-commentary strip patterns (regex, applied case-insensitively)
    pub strip_patterns: Vec<String>,

    /// Whitespace normalization policy
    pub whitespace_policy: WhitespacePolicy,

    /// Strip characters outside the speakable set
    pub strict_charset: bool,

    /// Model call timeout in seconds
    pub model_timeout_secs: u64,

    /// Retry attempts for transient model failures
    pub model_retries: u32,

    /// Idle session expiry in seconds
    pub session_ttl_secs: u64,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            model: "models/gemini-pro".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            greeting: DEFAULT_GREETING.to_string(),
            max_reply_chars: 1200,
            strip_patterns: DEFAULT_STRIP_PATTERNS
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            whitespace_policy: WhitespacePolicy::BlankLines,
            strict_charset: true,
            model_timeout_secs: 30,
            model_retries: 2,
            session_ttl_secs: 1800,
        }
    }
}

impl CoachConfig {
    /// Bounded timeout for one model call
    #[must_use]
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    /// Idle session expiry
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// TTS backend selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsBackend {
    #[default]
    OpenAi,
    ElevenLabs,
}

/// Voice synthesis configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// TTS backend
    pub provider: TtsBackend,

    /// TTS model (e.g. "tts-1")
    pub tts_model: String,

    /// TTS voice identifier (e.g. "alloy")
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,

    /// Target sample rate in Hz
    pub sample_rate: u32,

    /// Synthesis call timeout in seconds
    pub synthesis_timeout_secs: u64,

    /// Audio artifact expiry in seconds
    pub audio_ttl_secs: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            provider: TtsBackend::OpenAi,
            tts_model: "tts-1".to_string(),
            tts_voice: "alloy".to_string(),
            tts_speed: 1.0,
            sample_rate: 24_000,
            synthesis_timeout_secs: 30,
            audio_ttl_secs: 900,
        }
    }
}

impl VoiceConfig {
    /// Bounded timeout for one synthesis call
    #[must_use]
    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    /// Audio artifact expiry
    #[must_use]
    pub fn audio_ttl(&self) -> Duration {
        Duration::from_secs(self.audio_ttl_secs)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Port to listen on (0 means the default from the CLI applies)
    pub port: Option<u16>,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,
}

/// API keys for external services
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// Gemini API key (chat)
    pub gemini: Option<SecretString>,

    /// `OpenAI` API key (TTS)
    pub openai: Option<SecretString>,

    /// ElevenLabs API key (optional TTS)
    pub elevenlabs: Option<SecretString>,
}

/// Return the default config file path (`~/.config/rostrum/config.toml`)
#[must_use]
pub fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("dev", "rostrum", "rostrum").map_or_else(
        || PathBuf::from("config.toml"),
        |d| d.config_dir().join("config.toml"),
    )
}

impl Config {
    /// Load configuration from an optional TOML file plus the environment
    ///
    /// A missing file is not an error — defaults apply. Credentials come
    /// from the file's `[api_keys]` section, overridden by `GEMINI_API_KEY`,
    /// `OPENAI_API_KEY` and `ELEVENLABS_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns error if an explicitly given file is unreadable or malformed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = Self::load_file(path)?;
        let mut config = Self {
            coach: CoachConfig::default(),
            voice: VoiceConfig::default(),
            server: ServerConfig::default(),
            api_keys: ApiKeys::default(),
        };

        if let Some(file) = file {
            config.apply_file(file);
        }
        config.apply_env();

        Ok(config)
    }

    fn load_file(path: Option<&Path>) -> Result<Option<ConfigFile>> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(crate::Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&path)?;
        let file = toml::from_str(&raw)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(Some(file))
    }

    fn apply_file(&mut self, file: ConfigFile) {
        let coach = file.coach;
        if let Some(model) = coach.model {
            self.coach.model = model;
        }
        if let Some(prompt) = coach.system_prompt {
            self.coach.system_prompt = prompt;
        }
        if let Some(greeting) = coach.greeting {
            self.coach.greeting = greeting;
        }
        if let Some(max) = coach.max_reply_chars {
            self.coach.max_reply_chars = max;
        }
        if let Some(patterns) = coach.strip_patterns {
            self.coach.strip_patterns = patterns;
        }
        if let Some(policy) = coach.whitespace_policy {
            self.coach.whitespace_policy = policy;
        }
        if let Some(strict) = coach.strict_charset {
            self.coach.strict_charset = strict;
        }
        if let Some(timeout) = coach.model_timeout_secs {
            self.coach.model_timeout_secs = timeout;
        }
        if let Some(retries) = coach.model_retries {
            self.coach.model_retries = retries;
        }
        if let Some(ttl) = coach.session_ttl_secs {
            self.coach.session_ttl_secs = ttl;
        }

        let voice = file.voice;
        if let Some(provider) = voice.provider {
            self.voice.provider = provider;
        }
        if let Some(model) = voice.tts_model {
            self.voice.tts_model = model;
        }
        if let Some(tts_voice) = voice.tts_voice {
            self.voice.tts_voice = tts_voice;
        }
        if let Some(speed) = voice.tts_speed {
            self.voice.tts_speed = speed;
        }
        if let Some(rate) = voice.sample_rate {
            self.voice.sample_rate = rate;
        }
        if let Some(timeout) = voice.synthesis_timeout_secs {
            self.voice.synthesis_timeout_secs = timeout;
        }
        if let Some(ttl) = voice.audio_ttl_secs {
            self.voice.audio_ttl_secs = ttl;
        }

        let server = file.server;
        if let Some(port) = server.port {
            self.server.port = Some(port);
        }
        if let Some(dir) = server.static_dir {
            self.server.static_dir = Some(dir);
        }

        let keys = file.api_keys;
        self.api_keys.gemini = keys.gemini.map(SecretString::from);
        self.api_keys.openai = keys.openai.map(SecretString::from);
        self.api_keys.elevenlabs = keys.elevenlabs.map(SecretString::from);
    }

    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.api_keys.gemini = Some(SecretString::from(key));
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.api_keys.openai = Some(SecretString::from(key));
        }
        if let Ok(key) = std::env::var("ELEVENLABS_API_KEY") {
            self.api_keys.elevenlabs = Some(SecretString::from(key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_overlay_replaces_defaults() {
        let raw = r#"
            [coach]
            model = "models/gemini-1.5-pro"
            max_reply_chars = 500
            whitespace_policy = "single-line"

            [voice]
            provider = "elevenlabs"
            sample_rate = 44100

            [server]
            port = 9000
        "#;
        let file: ConfigFile = toml::from_str(raw).unwrap();

        let mut config = Config {
            coach: CoachConfig::default(),
            voice: VoiceConfig::default(),
            server: ServerConfig::default(),
            api_keys: ApiKeys::default(),
        };
        config.apply_file(file);

        assert_eq!(config.coach.model, "models/gemini-1.5-pro");
        assert_eq!(config.coach.max_reply_chars, 500);
        assert_eq!(config.coach.whitespace_policy, WhitespacePolicy::SingleLine);
        assert_eq!(config.voice.provider, TtsBackend::ElevenLabs);
        assert_eq!(config.voice.sample_rate, 44_100);
        assert_eq!(config.server.port, Some(9000));
        // Untouched fields keep their defaults
        assert_eq!(config.coach.greeting, DEFAULT_GREETING);
        assert_eq!(config.voice.tts_voice, "alloy");
    }

    #[test]
    fn empty_file_keeps_all_defaults() {
        let file: ConfigFile = toml::from_str("").unwrap();

        let mut config = Config {
            coach: CoachConfig::default(),
            voice: VoiceConfig::default(),
            server: ServerConfig::default(),
            api_keys: ApiKeys::default(),
        };
        config.apply_file(file);

        assert_eq!(config.coach.model, "models/gemini-pro");
        assert_eq!(config.coach.max_reply_chars, 1200);
        assert!(config.coach.strict_charset);
        assert_eq!(config.voice.provider, TtsBackend::OpenAi);
    }

    #[test]
    fn default_strip_patterns_compile() {
        let config = CoachConfig::default();
        let cleaner = crate::coach::cleaner::ReplyCleaner::new(
            &config.strip_patterns,
            config.whitespace_policy,
            config.strict_charset,
            config.max_reply_chars,
        );
        assert!(cleaner.is_ok());
    }
}
