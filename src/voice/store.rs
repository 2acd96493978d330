//! Transient audio artifact store
//!
//! Every synthesized reply becomes an artifact under a collision-free random
//! name, retrievable until its TTL expires. Artifacts live in memory; the
//! store is reset on restart, matching the transient lifecycle of the audio.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::RngCore;
use tokio::sync::RwLock;

struct StoredAudio {
    bytes: Arc<[u8]>,
    created: Instant,
}

/// In-memory artifact store with TTL-based retention
///
/// Cheap to clone; all clones share the same underlying map.
#[derive(Clone)]
pub struct AudioStore {
    entries: Arc<RwLock<HashMap<String, StoredAudio>>>,
    ttl: Duration,
}

impl AudioStore {
    /// Create a store whose artifacts expire `ttl` after creation
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Store audio bytes under a fresh name; returns the artifact filename
    pub async fn store(&self, bytes: Vec<u8>) -> String {
        let mut entries = self.entries.write().await;
        let mut name = artifact_name();
        while entries.contains_key(&name) {
            name = artifact_name();
        }

        entries.insert(
            name.clone(),
            StoredAudio {
                bytes: bytes.into(),
                created: Instant::now(),
            },
        );

        name
    }

    /// Fetch an artifact's bytes, if it exists and has not expired
    pub async fn get(&self, filename: &str) -> Option<Arc<[u8]>> {
        let entries = self.entries.read().await;
        entries
            .get(filename)
            .filter(|entry| entry.created.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.bytes))
    }

    /// Number of stored artifacts, expired ones included until swept
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Drop expired artifacts; returns the number evicted
    pub async fn sweep(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.created.elapsed() < ttl);
        before - entries.len()
    }

    /// Spawn a background task that sweeps expired artifacts every `interval`
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let evicted = store.sweep().await;
                if evicted > 0 {
                    tracing::debug!(evicted, "expired audio artifacts");
                }
            }
        })
    }
}

/// Generate a random artifact filename (`speech_<16 hex>.mp3`)
fn artifact_name() -> String {
    let mut suffix = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut suffix);
    format!("speech_{}.mp3", hex::encode(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_audio_is_retrievable() {
        let store = AudioStore::new(Duration::from_secs(60));
        let name = store.store(vec![1, 2, 3]).await;

        let bytes = store.get(&name).await.unwrap();
        assert_eq!(&*bytes, &[1, 2, 3]);
    }

    #[tokio::test]
    async fn unknown_artifact_is_absent() {
        let store = AudioStore::new(Duration::from_secs(60));
        assert!(store.get("speech_0000000000000000.mp3").await.is_none());
    }

    #[tokio::test]
    async fn names_are_unique_and_well_formed() {
        let store = AudioStore::new(Duration::from_secs(60));
        let first = store.store(vec![0]).await;
        let second = store.store(vec![0]).await;

        assert_ne!(first, second);
        for name in [&first, &second] {
            assert!(name.starts_with("speech_"));
            assert!(name.ends_with(".mp3"));
            assert_eq!(name.len(), "speech_".len() + 16 + ".mp3".len());
        }
    }

    #[tokio::test]
    async fn expired_artifacts_are_not_served() {
        let store = AudioStore::new(Duration::ZERO);
        let name = store.store(vec![9]).await;

        assert!(store.get(&name).await.is_none());
    }

    #[tokio::test]
    async fn sweep_evicts_expired_artifacts() {
        let store = AudioStore::new(Duration::ZERO);
        store.store(vec![1]).await;
        store.store(vec![2]).await;
        assert_eq!(store.len().await, 2);

        assert_eq!(store.sweep().await, 2);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn live_artifacts_survive_a_sweep() {
        let store = AudioStore::new(Duration::from_secs(60));
        let name = store.store(vec![7]).await;

        assert_eq!(store.sweep().await, 0);
        assert!(store.get(&name).await.is_some());
    }
}
