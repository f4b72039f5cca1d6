//! MemoryStore trait definition.
//!
//! Per-advisor memory persistence keyed by (advisor_id, conversation_id).
//! Follows the same RPITIT pattern as the other repository ports.

use chrono::Utc;
use counsel_types::advisor::AdvisorId;
use counsel_types::error::{MemoryError, RepositoryError};
use counsel_types::memory::{AgentMemory, MemoryEntry};
use uuid::Uuid;

/// Repository trait for agent memory.
///
/// Implementations live in counsel-infra (e.g., `SqliteMemoryStore`).
pub trait MemoryStore: Send + Sync {
    /// Create one empty memory per advisor for a conversation.
    ///
    /// Fails with [`MemoryError::DuplicateInitialization`] if the
    /// conversation already has any memory record.
    fn initialize(
        &self,
        conversation_id: &Uuid,
        advisor_ids: &[AdvisorId],
    ) -> impl std::future::Future<Output = Result<Vec<AgentMemory>, MemoryError>> + Send;

    /// Get one memory record.
    fn get_memory(
        &self,
        advisor_id: &AdvisorId,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<AgentMemory>, RepositoryError>> + Send;

    /// Every memory record of a conversation, in insertion order.
    fn list_memories(
        &self,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<AgentMemory>, RepositoryError>> + Send;

    /// Insert or replace a memory record.
    fn save_memory(
        &self,
        memory: &AgentMemory,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Raw entries of one memory, oldest first. Empty if none exist.
    fn load(
        &self,
        advisor_id: &AdvisorId,
        conversation_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryEntry>, RepositoryError>> + Send {
        async move {
            Ok(self
                .get_memory(advisor_id, conversation_id)
                .await?
                .map(|memory| memory.window.entries())
                .unwrap_or_default())
        }
    }

    /// Append one exchange pair, creating the memory if it is missing.
    ///
    /// Read-modify-write with no locking of its own. Callers must hold the
    /// conversation's `ConversationLocks` entry, as
    /// `ConversationService::append_memory` does.
    fn append(
        &self,
        advisor_id: &AdvisorId,
        conversation_id: &Uuid,
        user_text: &str,
        advisor_text: &str,
    ) -> impl std::future::Future<Output = Result<AgentMemory, RepositoryError>> + Send {
        async move {
            let now = Utc::now();
            let mut memory = self
                .get_memory(advisor_id, conversation_id)
                .await?
                .unwrap_or_else(|| AgentMemory::empty(advisor_id.clone(), *conversation_id, now));
            memory.record(user_text, advisor_text, now);
            self.save_memory(&memory).await?;
            Ok(memory)
        }
    }
}
