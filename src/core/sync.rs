//! Keyed asynchronous locks
//!
//! Serializes operations that share a string key while leaving unrelated keys
//! free to proceed concurrently. Used to guarantee that at most one
//! install/update operation runs per plugin id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Table of lazily-created async mutexes, one per key.
///
/// Entries are never removed; the key space is the set of plugin ids, which
/// stays small for the lifetime of the process.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, creating it on first use.
    ///
    /// The returned guard must be held for the full duration of the operation
    /// on that key.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let entry = {
            // A poisoned table only means another thread panicked while
            // inserting; the map itself is still usable.
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        entry.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks = Arc::new(KeyedLocks::new());

        let guard = locks.acquire("plugin-a").await;

        let locks_clone = Arc::clone(&locks);
        let contender = tokio::spawn(async move {
            let _guard = locks_clone.acquire("plugin-a").await;
        });

        // The second acquire must not complete while the guard is held.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .expect("contender should finish once the guard is released")
            .unwrap();
    }

    #[tokio::test]
    async fn test_distinct_keys_are_independent() {
        let locks = KeyedLocks::new();

        let _a = locks.acquire("plugin-a").await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire("plugin-b")).await;
        assert!(b.is_ok(), "a different key must not block");
    }

    #[tokio::test]
    async fn test_reacquire_after_release() {
        let locks = KeyedLocks::new();

        drop(locks.acquire("plugin-a").await);
        let _again = locks.acquire("plugin-a").await;
    }
}
