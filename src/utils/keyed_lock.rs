//! Per-key async mutual exclusion.
//!
//! The roster partition of a session is a read-modify-write over two tables,
//! and a class's score recompute reads many tables before replacing rows, so
//! both are serialized on their owning id.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use once_cell::sync::Lazy;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Serializes reconcile calls per session.
pub static SESSION_LOCKS: Lazy<KeyedLocks> = Lazy::new(KeyedLocks::new);

/// Serializes score recomputation per class.
pub static CLASS_LOCKS: Lazy<KeyedLocks> = Lazy::new(KeyedLocks::new);

pub struct KeyedLocks {
    locks: StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self {
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Acquires the mutex for `key`, creating it on first use. The guard is
    /// owned so it can be held across await points.
    pub async fn acquire(&self, key: Uuid) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.locks.lock().expect("keyed lock registry poisoned");
            map.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
        };
        lock.lock_owned().await
    }
}

impl Default for KeyedLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks = KeyedLocks::new();
        let key = Uuid::new_v4();

        let guard = locks.acquire(key).await;

        // Other keys are independent of the held lock.
        let _other = locks.acquire(Uuid::new_v4()).await;

        // The same key stays blocked until the guard is dropped.
        let pending =
            tokio::time::timeout(std::time::Duration::from_millis(20), locks.acquire(key)).await;
        assert!(pending.is_err());

        drop(guard);
        let _reacquired = locks.acquire(key).await;
    }
}
