//! Per-key async locks so concurrent cache misses compute a value once.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// Map of async mutexes keyed by string. Entries live only while held or awaited.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    inner: Arc<Mutex<LockMap>>,
}

/// Holds the lock for one key until dropped.
pub struct KeyGuard {
    key: String,
    locks: Arc<Mutex<LockMap>>,
    _guard: OwnedMutexGuard<()>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`.
    pub async fn lock(&self, key: &str) -> KeyGuard {
        let mutex = {
            let mut map = self.inner.lock();
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        let guard = mutex.lock_owned().await;

        KeyGuard {
            key: key.to_string(),
            locks: self.inner.clone(),
            _guard: guard,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().len()
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        let mut map = self.locks.lock();
        // One reference in the map, one inside our guard: nobody else is waiting.
        if let Some(mutex) = map.get(&self.key) {
            if Arc::strong_count(mutex) <= 2 {
                map.remove(&self.key);
            }
        }
    }
}
