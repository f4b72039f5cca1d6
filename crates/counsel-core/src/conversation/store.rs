//! ConversationStore trait definition.
//!
//! Provides CRUD for conversations, ordered message reads, and the atomic
//! turn commit. Follows the same RPITIT pattern as the other ports.

use chrono::{DateTime, Utc};
use counsel_types::conversation::{Conversation, Message};
use counsel_types::error::RepositoryError;
use counsel_types::memory::AgentMemory;
use uuid::Uuid;

/// Everything one accepted turn writes.
///
/// Applied all-or-nothing by [`ConversationStore::commit_turn`]. Messages
/// are inserted in vector order: the user message first, then advisor
/// replies in registry order.
#[derive(Debug, Clone)]
pub struct TurnCommit {
    pub conversation_id: Uuid,
    pub user_message: Message,
    pub advisor_messages: Vec<Message>,
    pub memories: Vec<AgentMemory>,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for conversation and message persistence.
///
/// Implementations live in counsel-infra (e.g., `SqliteConversationStore`).
pub trait ConversationStore: Send + Sync {
    fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    fn get_conversation(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// List an owner's conversations, most recently updated first.
    fn list_conversations(
        &self,
        owner_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;

    /// Persist title and `updated_at`. `NotFound` if the row is missing.
    fn update_conversation(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a conversation together with its messages and memories.
    fn delete_conversation(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Messages ordered by `created_at`, ties in insertion order.
    fn get_messages(
        &self,
        conversation_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Write one turn atomically.
    fn commit_turn(
        &self,
        commit: &TurnCommit,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
