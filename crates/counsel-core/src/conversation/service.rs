//! Conversation service orchestrating conversation lifecycle and turns.
//!
//! ConversationService coordinates the ConversationStore, MemoryStore,
//! advisor registry and responder: creating conversations with one memory
//! per advisor, listing and renaming them, and running turns.

use std::sync::Arc;

use counsel_types::advisor::AdvisorId;
use counsel_types::conversation::{Conversation, Message};
use counsel_types::error::{ConversationError, RepositoryError, TurnError};
use counsel_types::memory::AgentMemory;
use counsel_types::turn::TurnOutcome;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::conversation::store::ConversationStore;
use crate::memory::store::MemoryStore;
use crate::registry::AdvisorRegistry;
use crate::responder::box_responder::BoxAdvisorResponder;
use crate::turn::locks::ConversationLocks;
use crate::turn::orchestrator::{TurnConfig, TurnOrchestrator};

/// Orchestrates conversation lifecycle and message turns.
///
/// Generic over `ConversationStore` and `MemoryStore` to maintain
/// clean architecture (counsel-core never depends on counsel-infra).
pub struct ConversationService<C: ConversationStore, M: MemoryStore> {
    registry: AdvisorRegistry,
    conversations: C,
    memories: M,
    responder: Arc<BoxAdvisorResponder>,
    locks: ConversationLocks,
    turn_config: TurnConfig,
}

impl<C: ConversationStore, M: MemoryStore> ConversationService<C, M> {
    pub fn new(
        registry: AdvisorRegistry,
        conversations: C,
        memories: M,
        responder: Arc<BoxAdvisorResponder>,
        turn_config: TurnConfig,
    ) -> Self {
        Self {
            registry,
            conversations,
            memories,
            responder,
            locks: ConversationLocks::new(),
            turn_config,
        }
    }

    pub fn registry(&self) -> &AdvisorRegistry {
        &self.registry
    }

    pub fn conversation_store(&self) -> &C {
        &self.conversations
    }

    pub fn memory_store(&self) -> &M {
        &self.memories
    }

    // --- Conversation lifecycle ---

    /// Create a conversation and initialize one memory per registered advisor.
    pub async fn create_conversation(
        &self,
        owner_id: &str,
        title: Option<String>,
    ) -> Result<Conversation, ConversationError> {
        if owner_id.trim().is_empty() {
            return Err(ConversationError::Validation(
                "owner_id must not be empty".to_string(),
            ));
        }

        let conversation = Conversation::new(owner_id.trim(), title);
        let conversation = self.conversations.create_conversation(&conversation).await?;

        if self.registry.is_empty() {
            warn!(conversation_id = %conversation.id, "No advisors registered; conversation has no advisors");
            return Ok(conversation);
        }

        let memories = match self
            .memories
            .initialize(&conversation.id, &self.registry.ids())
            .await
        {
            Ok(memories) => memories,
            Err(e) => {
                // Roll back so no advisor-less conversation is left behind.
                if let Err(cleanup) = self.conversations.delete_conversation(&conversation.id).await {
                    warn!(
                        conversation_id = %conversation.id,
                        error = %cleanup,
                        "Failed to remove conversation after memory initialization failed"
                    );
                }
                return Err(e.into());
            }
        };
        info!(
            conversation_id = %conversation.id,
            advisors = memories.len(),
            "Conversation created"
        );
        Ok(conversation)
    }

    pub async fn get_conversation(&self, id: &Uuid) -> Result<Conversation, ConversationError> {
        self.conversations
            .get_conversation(id)
            .await?
            .ok_or(ConversationError::NotFound(*id))
    }

    /// List an owner's conversations, most recently updated first.
    pub async fn list_conversations(
        &self,
        owner_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Conversation>, ConversationError> {
        Ok(self
            .conversations
            .list_conversations(owner_id, limit, offset)
            .await?)
    }

    pub async fn rename_conversation(
        &self,
        id: &Uuid,
        title: &str,
    ) -> Result<Conversation, ConversationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ConversationError::Validation(
                "title must not be empty".to_string(),
            ));
        }

        let mut conversation = self.get_conversation(id).await?;
        conversation.title = title.to_string();
        self.conversations.update_conversation(&conversation).await?;
        info!(conversation_id = %id, "Conversation renamed");
        Ok(conversation)
    }

    /// Delete a conversation, its messages and memories, then its lock.
    ///
    /// Waits for any in-flight turn on the conversation to finish first.
    /// The lock is kept when the row survives a failed delete.
    pub async fn delete_conversation(&self, id: &Uuid) -> Result<(), ConversationError> {
        let result = {
            let _guard = self.locks.acquire(*id).await;
            self.conversations.delete_conversation(id).await
        };

        match result {
            Ok(()) => {
                self.locks.remove(id);
                info!(conversation_id = %id, "Conversation deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => {
                self.locks.remove(id);
                Err(ConversationError::NotFound(*id))
            }
            Err(e) => Err(e.into()),
        }
    }

    // --- Messages and memory ---

    pub async fn get_messages(
        &self,
        id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Message>, ConversationError> {
        self.get_conversation(id).await?;
        Ok(self.conversations.get_messages(id, limit, offset).await?)
    }

    /// Memory records of a conversation in registry order.
    pub async fn advisor_memories(&self, id: &Uuid) -> Result<Vec<AgentMemory>, ConversationError> {
        self.get_conversation(id).await?;
        let mut memories = self.memories.list_memories(id).await?;
        memories.sort_by_key(|m| self.registry.position(&m.advisor_id).unwrap_or(usize::MAX));
        Ok(memories)
    }

    /// Append one exchange pair to an advisor's memory outside a turn.
    ///
    /// Holds the conversation lock so a concurrent turn commit cannot
    /// overwrite the pair.
    pub async fn append_memory(
        &self,
        advisor_id: &AdvisorId,
        conversation_id: &Uuid,
        user_text: &str,
        advisor_text: &str,
    ) -> Result<AgentMemory, ConversationError> {
        self.get_conversation(conversation_id).await?;
        let _guard = self.locks.acquire(*conversation_id).await;
        if self.conversations.get_conversation(conversation_id).await?.is_none() {
            self.locks.remove(conversation_id);
            return Err(ConversationError::NotFound(*conversation_id));
        }
        Ok(self
            .memories
            .append(advisor_id, conversation_id, user_text, advisor_text)
            .await?)
    }

    /// Run one turn with a per-call orchestrator.
    pub async fn send_message(
        &self,
        id: Uuid,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, TurnError> {
        TurnOrchestrator::new(
            &self.registry,
            &self.conversations,
            &self.memories,
            Arc::clone(&self.responder),
            &self.locks,
            self.turn_config,
        )
        .run(id, text, cancel)
        .await
    }
}
