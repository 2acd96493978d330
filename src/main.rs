use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rostrum::api::ApiServerBuilder;
use rostrum::coach::TurnProcessor;
use rostrum::config::{Config, TtsBackend};
use rostrum::model::{ChatModel, GeminiClient};
use rostrum::session::SessionStore;
use rostrum::voice::{AudioStore, SpeechSynthesizer, TextToSpeech};

/// How often the background sweepers look for expired sessions and artifacts
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Rostrum - voice-enabled coaching assistant gateway
#[derive(Parser)]
#[command(name = "rostrum", version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to ~/.config/rostrum/config.toml)
    #[arg(short, long, env = "ROSTRUM_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, env = "ROSTRUM_PORT", default_value = "8787")]
    port: u16,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Synthesize a line of text and write the MP3 next to the working dir
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,rostrum=info",
        1 => "info,rostrum=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestTts { text } => test_tts(&mut config, &text).await,
        };
    }

    let port = config.server.port.unwrap_or(cli.port);
    tracing::info!(port, model = %config.coach.model, "starting rostrum gateway");

    let sessions = SessionStore::new(
        &config.coach.system_prompt,
        &config.coach.greeting,
        config.coach.session_ttl(),
    );
    let audio = AudioStore::new(config.voice.audio_ttl());
    sessions.spawn_sweeper(SWEEP_INTERVAL);
    audio.spawn_sweeper(SWEEP_INTERVAL);

    let mut builder = ApiServerBuilder::new(sessions, audio, port)
        .static_dir(config.server.static_dir.clone());

    match build_model(&mut config)? {
        Some(model) => {
            let processor = TurnProcessor::new(model, &config.coach)?;
            builder = builder.processor(Arc::new(processor));
        }
        None => tracing::warn!("GEMINI_API_KEY not set; chat endpoint will answer 503"),
    }

    match build_synthesizer(&mut config)? {
        Some(synthesizer) => builder = builder.synthesizer(synthesizer),
        None => tracing::warn!("no TTS credential set; chat endpoint will answer 503"),
    }

    builder.build().run().await?;
    Ok(())
}

/// Build the Gemini chat client when a credential is configured
fn build_model(config: &mut Config) -> anyhow::Result<Option<Arc<dyn ChatModel>>> {
    let Some(api_key) = config.api_keys.gemini.take() else {
        return Ok(None);
    };

    let client = GeminiClient::new(
        api_key,
        config.coach.model.clone(),
        config.coach.model_timeout(),
    )?;
    Ok(Some(Arc::new(client)))
}

/// Build the configured TTS backend when its credential is configured
fn build_synthesizer(config: &mut Config) -> anyhow::Result<Option<Arc<dyn SpeechSynthesizer>>> {
    let voice = config.voice.clone();
    let synthesizer: Option<Arc<dyn SpeechSynthesizer>> = match voice.provider {
        TtsBackend::OpenAi => match config.api_keys.openai.take() {
            Some(key) => Some(Arc::new(TextToSpeech::new_openai(
                key,
                voice.tts_voice.clone(),
                voice.tts_speed,
                voice.tts_model.clone(),
                voice.synthesis_timeout(),
            )?)),
            None => None,
        },
        TtsBackend::ElevenLabs => match config.api_keys.elevenlabs.take() {
            Some(key) => Some(Arc::new(TextToSpeech::new_elevenlabs(
                key,
                voice.tts_voice.clone(),
                voice.tts_model.clone(),
                voice.sample_rate,
                voice.synthesis_timeout(),
            )?)),
            None => None,
        },
    };

    Ok(synthesizer)
}

/// Synthesize `text` and write the result to `tts-test.mp3`
async fn test_tts(config: &mut Config, text: &str) -> anyhow::Result<()> {
    let Some(synthesizer) = build_synthesizer(config)? else {
        anyhow::bail!("no TTS credential set (OPENAI_API_KEY or ELEVENLABS_API_KEY)");
    };

    tracing::info!(chars = text.len(), "synthesizing");
    let audio = synthesizer.synthesize(text).await?;

    let path = PathBuf::from("tts-test.mp3");
    tokio::fs::write(&path, &audio).await?;
    tracing::info!(path = %path.display(), bytes = audio.len(), "wrote synthesized audio");

    Ok(())
}
