//! Per-key async locks.
//!
//! Serializes check-then-write sequences on the same key (a product cache
//! key, a catalog file path) across concurrent scrape runs.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Idle locks are pruned once the registry grows past this many keys.
const PRUNE_THRESHOLD: usize = 1024;

/// Registry of named mutexes, shared by cloning.
#[derive(Clone, Debug, Default)]
pub struct KeyLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`. Released when the guard drops.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().await;
            if map.len() >= PRUNE_THRESHOLD {
                map.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            map.entry(key.to_string()).or_default().clone()
        };
        entry.lock_owned().await
    }
}
