//! Per-conversation async mutexes.
//!
//! Every handler holds its conversation's lock for the whole read-modify-write,
//! so two events for the same conversation never interleave inside one process.
//! Entries exist only while some task holds or waits for the lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

/// Registry of conversation locks. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct ConversationLocks {
    locks: Arc<LockMap>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `conversation_id`.
    pub async fn acquire(&self, conversation_id: &str) -> ConversationGuard {
        // Clone under the shard lock so pruning cannot race the lookup.
        let registration = Registration {
            locks: Arc::clone(&self.locks),
            conversation_id: conversation_id.to_string(),
            lock: Arc::clone(
                self.locks
                    .entry(conversation_id.to_string())
                    .or_default()
                    .value(),
            ),
        };
        // Cancelled while waiting: the registration still prunes on drop.
        let guard = Arc::clone(&registration.lock).lock_owned().await;
        ConversationGuard {
            _guard: guard,
            registration,
        }
    }

    /// Number of conversations with a held or awaited lock.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

impl std::fmt::Debug for ConversationLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationLocks")
            .field("active", &self.locks.len())
            .finish()
    }
}

/// A task's claim on a map entry, held while waiting and while locked.
struct Registration {
    locks: Arc<LockMap>,
    conversation_id: String,
    lock: Arc<Mutex<()>>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        // Two references left (the map's and ours) means nobody else holds or waits.
        self.locks.remove_if(&self.conversation_id, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) == 2
        });
    }
}

/// Exclusive access to one conversation. Released on drop.
pub struct ConversationGuard {
    // Fields drop in order: the mutex is released before the entry is pruned.
    _guard: OwnedMutexGuard<()>,
    registration: Registration,
}

impl ConversationGuard {
    pub fn conversation_id(&self) -> &str {
        &self.registration.conversation_id
    }
}
