//! Per-session conversation state
//!
//! Every caller owns an independent conversation history scoped to a session
//! id. Histories are append-only for the lifetime of the session: turns are
//! never reordered or deleted. A session's lock is held for the whole turn,
//! so turns within one session apply in receipt order while different
//! sessions proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Speaker of a single conversation turn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message in a conversation
#[derive(Clone, Debug)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    /// Create a system turn
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }

    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// A single caller's conversation
///
/// Seeded at creation with the coaching system prompt and the fixed assistant
/// acknowledgment, so the model always sees its instructions first.
#[derive(Debug)]
pub struct Session {
    id: String,
    history: Vec<Turn>,
    last_activity: Instant,
}

impl Session {
    fn new(id: String, system_prompt: &str, greeting: &str) -> Self {
        Self {
            id,
            history: vec![Turn::system(system_prompt), Turn::assistant(greeting)],
            last_activity: Instant::now(),
        }
    }

    /// Session identifier
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ordered conversation history, oldest first
    #[must_use]
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Number of turns in the history, seed turns included
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Append a turn and refresh the activity timestamp
    pub fn push(&mut self, turn: Turn) {
        self.history.push(turn);
        self.last_activity = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }
}

/// Registry of live sessions keyed by session id
///
/// Cheap to clone; all clones share the same underlying map.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<Session>>>>>,
    system_prompt: Arc<str>,
    greeting: Arc<str>,
    ttl: Duration,
}

impl SessionStore {
    /// Create a store whose sessions are seeded with `system_prompt` and
    /// `greeting` and expire after `ttl` of inactivity
    #[must_use]
    pub fn new(system_prompt: &str, greeting: &str, ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            system_prompt: Arc::from(system_prompt),
            greeting: Arc::from(greeting),
            ttl,
        }
    }

    /// Fetch an existing session or create a fresh one
    ///
    /// An unknown or absent id yields a new session; the returned id is the
    /// one the caller should echo back on the next turn.
    pub async fn get_or_create(&self, id: Option<&str>) -> (String, Arc<Mutex<Session>>) {
        if let Some(id) = id {
            if let Some(session) = self.sessions.read().await.get(id) {
                return (id.to_string(), Arc::clone(session));
            }
        }

        let id = Uuid::new_v4().to_string();
        let session = Arc::new(Mutex::new(Session::new(
            id.clone(),
            &self.system_prompt,
            &self.greeting,
        )));
        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::clone(&session));

        (id, session)
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove sessions idle longer than the TTL
    ///
    /// A session whose lock is held has a turn in flight and is never
    /// evicted. Returns the number of sessions removed.
    pub async fn sweep(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, session| match session.try_lock() {
            Ok(guard) => guard.idle_for() < ttl,
            Err(_) => true,
        });
        before - sessions.len()
    }

    /// Spawn a background task that sweeps expired sessions every `interval`
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let evicted = store.sweep().await;
                if evicted > 0 {
                    tracing::debug!(evicted, "expired idle sessions");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROMPT: &str = "You are a debate coach.";
    const GREETING: &str = "Ready when you are.";

    #[tokio::test]
    async fn new_session_is_seeded_with_prompt_and_greeting() {
        let store = SessionStore::new(PROMPT, GREETING, Duration::from_secs(60));
        let (_, session) = store.get_or_create(None).await;
        let session = session.lock().await;

        assert_eq!(session.len(), 2);
        assert_eq!(session.history()[0].role, Role::System);
        assert_eq!(session.history()[0].text, PROMPT);
        assert_eq!(session.history()[1].role, Role::Assistant);
        assert_eq!(session.history()[1].text, GREETING);
    }

    #[tokio::test]
    async fn known_id_returns_same_session() {
        let store = SessionStore::new(PROMPT, GREETING, Duration::from_secs(60));
        let (id, session) = store.get_or_create(None).await;
        session.lock().await.push(Turn::user("hello"));

        let (id_again, session_again) = store.get_or_create(Some(&id)).await;
        assert_eq!(id, id_again);
        assert_eq!(session_again.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn unknown_id_creates_fresh_session() {
        let store = SessionStore::new(PROMPT, GREETING, Duration::from_secs(60));
        let (id, _) = store.get_or_create(Some("no-such-session")).await;

        assert_ne!(id, "no-such-session");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn sweep_evicts_idle_sessions() {
        let store = SessionStore::new(PROMPT, GREETING, Duration::ZERO);
        store.get_or_create(None).await;
        store.get_or_create(None).await;
        assert_eq!(store.len().await, 2);

        let evicted = store.sweep().await;
        assert_eq!(evicted, 2);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn sweep_keeps_sessions_with_turns_in_flight() {
        let store = SessionStore::new(PROMPT, GREETING, Duration::ZERO);
        let (_, session) = store.get_or_create(None).await;
        let guard = session.lock().await;

        assert_eq!(store.sweep().await, 0);
        assert_eq!(store.len().await, 1);
        drop(guard);
    }

    #[tokio::test]
    async fn history_order_is_preserved() {
        let store = SessionStore::new(PROMPT, GREETING, Duration::from_secs(60));
        let (_, session) = store.get_or_create(None).await;
        let mut session = session.lock().await;

        session.push(Turn::user("first"));
        session.push(Turn::assistant("second"));
        session.push(Turn::user("third"));

        let texts: Vec<&str> = session.history()[2..]
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }
}
