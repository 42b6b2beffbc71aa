//! Short-lived cache of live suspension flags.
//!
//! Used by the suspension gate when live checks are on, so a gated request
//! costs at most one user lookup per TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::{sync::RwLock, task::JoinHandle};
use tracing::debug;

/// Live suspension state of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspensionStatus {
    pub suspended: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
struct Entry {
    status: SuspensionStatus,
    fetched_at: Instant,
}

/// Suspension cache keyed by user id.
#[derive(Clone)]
pub struct SuspensionCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    ttl: Duration,
}

impl SuspensionCache {
    /// Create a cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Cached status, if still fresh.
    pub async fn get(&self, user_id: &str) -> Option<SuspensionStatus> {
        let entries = self.entries.read().await;
        entries
            .get(user_id)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.status.clone())
    }

    /// Record a freshly read status.
    pub async fn insert(&self, user_id: &str, status: SuspensionStatus) {
        let mut entries = self.entries.write().await;
        entries.insert(
            user_id.to_string(),
            Entry {
                status,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Forget a user, e.g. right after an admin changed their flag.
    pub async fn invalidate(&self, user_id: &str) {
        self.entries.write().await.remove(user_id);
    }

    /// Drop stale entries. Returns how many were evicted.
    pub async fn cleanup(&self) -> usize {
        let ttl = self.ttl;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.fetched_at.elapsed() < ttl);
        before - entries.len()
    }

    /// Run [`Self::cleanup`] every `every` until the handle is aborted.
    ///
    /// `every` must be non-zero.
    pub fn spawn_cleanup(&self, every: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = cache.cleanup().await;
                if evicted > 0 {
                    debug!(evicted, "Evicted stale suspension cache entries");
                }
            }
        })
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
