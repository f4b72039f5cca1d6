//! Per-conversation turn serialization.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// One async mutex per conversation.
///
/// Turns on the same conversation queue behind each other; different
/// conversations never contend. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct ConversationLocks {
    inner: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a conversation.
    pub async fn acquire(&self, conversation_id: Uuid) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the shard guard is released before awaiting.
        let lock = self.inner.entry(conversation_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Forget a conversation's lock (after it has been deleted).
    pub fn remove(&self, conversation_id: &Uuid) {
        self.inner.remove(conversation_id);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
