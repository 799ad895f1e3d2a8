/*!
 * Language-scoped locking and cooperative cancellation.
 *
 * Imports hold a shared lock on their language: several imports may run
 * side by side and each promotion is atomic inside its own transaction.
 * A plural migration holds the exclusive lock, so no import can rewrite
 * slot values of that language while they are being reshaped.
 */

use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// Registry of per-language reader/writer locks
#[derive(Debug, Default)]
pub struct LanguageLocks {
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

impl LanguageLocks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, language_id: &str) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(language_id.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    /// Acquire the lock shared by concurrent imports into one language
    pub async fn shared(&self, language_id: &str) -> OwnedRwLockReadGuard<()> {
        let guard = self.lock_for(language_id).read_owned().await;
        debug!("Acquired shared lock for language {}", language_id);
        guard
    }

    /// Acquire the lock that excludes every other writer of one language
    pub async fn exclusive(&self, language_id: &str) -> OwnedRwLockWriteGuard<()> {
        let guard = self.lock_for(language_id).write_owned().await;
        debug!("Acquired exclusive lock for language {}", language_id);
        guard
    }
}

/// Cancellation flag checked between units of work
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    /// A token that has not been tripped
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the running operation stops at its next checkpoint
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
