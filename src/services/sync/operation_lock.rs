//! In-flight guard for per-project sync operations.
//!
//! Two simultaneous full-replace operations on one target directory
//! would interleave delete/recreate arbitrarily, so a second sync for
//! the same project fails fast instead of queueing behind a download
//! that can take minutes.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Tracks which project ids currently have a sync in flight.
#[derive(Clone, Default)]
pub struct OperationLock {
    active: Arc<Mutex<HashSet<String>>>,
}

/// RAII guard; releases the project id when dropped.
pub struct OperationGuard {
    key: String,
    active: Arc<Mutex<HashSet<String>>>,
}

impl OperationLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` for the duration of the returned guard. `None` means
    /// another operation already holds it.
    pub fn acquire(&self, key: &str) -> Option<OperationGuard> {
        let mut active = self
            .active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !active.insert(key.to_string()) {
            return None;
        }
        Some(OperationGuard {
            key: key.to_string(),
            active: Arc::clone(&self.active),
        })
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.key);
    }
}
