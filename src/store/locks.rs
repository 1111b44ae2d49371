use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock};

/// Reserved lock key for the global tournament list (`torneos.json`).
/// Tournament ids are four digits, so it can never collide with one.
const LIST_KEY: &str = "__torneos__";

/// In-process serialization of the read-modify-write cycle, keyed by
/// tournament id. Every mutating service call holds the tournament's lock
/// for the duration of read → mutate → write, which removes the
/// last-writer-wins race the synchronous file store would otherwise have.
#[derive(Clone, Default)]
pub struct TournamentLocks {
    inner: Arc<RwLock<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl TournamentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for one tournament's documents.
    pub async fn acquire(&self, torneo_id: &str) -> OwnedMutexGuard<()> {
        self.lock_for(torneo_id).await.lock_owned().await
    }

    /// Acquires the lock guarding the global tournament list.
    pub async fn acquire_list(&self) -> OwnedMutexGuard<()> {
        self.lock_for(LIST_KEY).await.lock_owned().await
    }

    /// Drops the lock entry for a deleted tournament.
    pub async fn forget(&self, torneo_id: &str) {
        self.inner.write().await.remove(torneo_id);
    }

    async fn lock_for(&self, key: &str) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.inner.read().await;
            if let Some(lock) = guard.get(key) {
                return lock.clone();
            }
        }

        let mut guard = self.inner.write().await;
        guard
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
