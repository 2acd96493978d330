//! Conversational turn processing
//!
//! One linear pipeline per turn: validate the utterance, delegate to the
//! model collaborator with the full session history, clean the reply, record
//! it. Model failures never propagate past this boundary; they degrade to a
//! user-facing text reply so the caller always gets something speakable.

pub mod cleaner;

use std::sync::Arc;
use std::time::Duration;

use crate::config::CoachConfig;
use crate::model::{ChatModel, ModelError};
use crate::session::{Session, Turn};
use cleaner::ReplyCleaner;

/// Fixed reply for empty or whitespace-only input
pub const EMPTY_INPUT_REPLY: &str = "Please provide a non-empty message.";

const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// The cleaned, length-capped assistant response for one turn
#[derive(Clone, Debug)]
pub struct CoachReply {
    /// Raw model text; `None` when the model was not consulted
    /// (empty input or a failed invocation)
    pub raw: Option<String>,

    /// Final cleaned text, always safe to speak
    pub text: String,

    /// Whether the cleaned text was cut at the configured cap
    pub truncated: bool,
}

impl CoachReply {
    fn fallback(text: String) -> Self {
        Self {
            raw: None,
            text,
            truncated: false,
        }
    }
}

/// Processes one conversational turn against a model collaborator
pub struct TurnProcessor {
    model: Arc<dyn ChatModel>,
    cleaner: ReplyCleaner,
    model_timeout: Duration,
    retries: u32,
}

impl TurnProcessor {
    /// Build a processor from the coaching configuration
    ///
    /// # Errors
    ///
    /// Returns error if a configured strip pattern is not a valid regex
    pub fn new(model: Arc<dyn ChatModel>, config: &CoachConfig) -> crate::Result<Self> {
        let cleaner = ReplyCleaner::new(
            &config.strip_patterns,
            config.whitespace_policy,
            config.strict_charset,
            config.max_reply_chars,
        )?;

        Ok(Self {
            model,
            cleaner,
            model_timeout: config.model_timeout(),
            retries: config.model_retries,
        })
    }

    /// Process one user utterance against the session history
    ///
    /// Empty input short-circuits with a fixed sentinel and leaves the
    /// history untouched. On success the history grows by exactly two turns:
    /// the user's utterance and the cleaned reply. On model failure the
    /// user's turn stays recorded, the failed reply is not, and the returned
    /// text describes the error kind.
    pub async fn process_turn(&self, session: &mut Session, user_input: &str) -> CoachReply {
        let input = user_input.trim();
        if input.is_empty() {
            return CoachReply::fallback(EMPTY_INPUT_REPLY.to_string());
        }

        session.push(Turn::user(input));

        let raw = match self.generate_with_retry(session.history()).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "model invocation failed");
                return CoachReply::fallback(format!(
                    "An error occurred while processing your request: {}. Please try again.",
                    e.kind()
                ));
            }
        };

        let (text, truncated) = self.cleaner.clean(&raw);
        session.push(Turn::assistant(text.clone()));

        CoachReply {
            raw: Some(raw),
            text,
            truncated,
        }
    }

    /// Invoke the model under a bounded timeout, retrying transient failures
    /// with exponential backoff
    async fn generate_with_retry(&self, history: &[Turn]) -> Result<String, ModelError> {
        let mut attempt = 0;
        loop {
            let result = match tokio::time::timeout(self.model_timeout, self.model.generate(history))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ModelError::Timeout),
            };

            match result {
                Ok(raw) => return Ok(raw),
                Err(e) if e.is_transient() && attempt < self.retries => {
                    tracing::warn!(
                        kind = e.kind(),
                        attempt = attempt + 1,
                        "transient model failure, retrying"
                    );
                    tokio::time::sleep(RETRY_BASE_DELAY * 2u32.pow(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
