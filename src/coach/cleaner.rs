//! Canonical reply cleaning pipeline
//!
//! Model replies are read aloud by the synthesis collaborator, so everything
//! that only makes sense on screen — markdown sigils, analysis labels,
//! bracketed emotion tags — is stripped before the reply is treated as final.
//! The pipeline is idempotent on its own output.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::{Error, Result};

/// Marker appended when a reply is cut at the configured length cap
pub const ELLIPSIS: &str = "...";

/// Meta-commentary lead-ins stripped by default, case-insensitively
///
/// Covers the label styles the model is known to emit despite the system
/// prompt asking for plain conversational text.
pub const DEFAULT_STRIP_PATTERNS: &[&str] = &[
    r"^\s*analysis\s*:\s*",
    r"^\s*tone\s*:\s*",
    r"^\s*feedback\s*:\s*",
    r"^\s*response\s*:\s*",
    r"^\s*\[[a-z ]+\]\s*",
];

/// Whitespace normalization policy
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WhitespacePolicy {
    /// Collapse runs of three or more newlines down to two
    #[default]
    BlankLines,
    /// Collapse every whitespace run to a single space
    SingleLine,
}

/// Configuration-driven text cleaner applied to every model reply
pub struct ReplyCleaner {
    headings: Regex,
    emphasis: Regex,
    list_prefixes: Regex,
    meta_patterns: Vec<Regex>,
    blank_lines: Regex,
    whitespace_runs: Regex,
    non_speakable: Regex,
    policy: WhitespacePolicy,
    strict_charset: bool,
    max_reply_chars: usize,
}

impl ReplyCleaner {
    /// Build a cleaner from configured strip patterns and policy knobs
    ///
    /// # Errors
    ///
    /// Returns error if a configured strip pattern is not a valid regex
    pub fn new(
        strip_patterns: &[String],
        policy: WhitespacePolicy,
        strict_charset: bool,
        max_reply_chars: usize,
    ) -> Result<Self> {
        let meta_patterns = strip_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .multi_line(true)
                    .build()
                    .map_err(|e| Error::Config(format!("invalid strip pattern {pattern:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            headings: Regex::new(r"#{1,6}\s?").expect("static pattern"),
            emphasis: Regex::new(r"[*_]{1,2}").expect("static pattern"),
            list_prefixes: Regex::new(r"(?m)^\s*(?:[-*+]|\d+\.)\s+").expect("static pattern"),
            blank_lines: Regex::new(r"\n{3,}").expect("static pattern"),
            whitespace_runs: Regex::new(r"\s+").expect("static pattern"),
            non_speakable: Regex::new(r"[^\w\s.,?!]").expect("static pattern"),
            meta_patterns,
            policy,
            strict_charset,
            max_reply_chars,
        })
    }

    /// Clean a raw model reply
    ///
    /// Returns the cleaned text and whether it was truncated at the cap.
    /// Steps run in a fixed order: markdown strip, meta-commentary strip,
    /// whitespace normalization, optional charset strictness, trim, cap.
    #[must_use]
    pub fn clean(&self, raw: &str) -> (String, bool) {
        // List prefixes go before emphasis, or `* item` bullets would lose
        // their sigil to the emphasis pass and leave the prefix behind.
        let text = self.headings.replace_all(raw, "");
        let text = self.list_prefixes.replace_all(&text, "");
        let mut text = self.emphasis.replace_all(&text, "").into_owned();

        for pattern in &self.meta_patterns {
            text = pattern.replace_all(&text, "").into_owned();
        }

        let text = match self.policy {
            WhitespacePolicy::BlankLines => self.blank_lines.replace_all(&text, "\n\n"),
            WhitespacePolicy::SingleLine => self.whitespace_runs.replace_all(&text, " "),
        };

        let text = if self.strict_charset {
            self.non_speakable.replace_all(&text, "").into_owned()
        } else {
            text.into_owned()
        };

        let text = text.trim();

        if text.chars().count() > self.max_reply_chars {
            let mut capped: String = text.chars().take(self.max_reply_chars).collect();
            capped.push_str(ELLIPSIS);
            (capped, true)
        } else {
            (text.to_string(), false)
        }
    }
}
