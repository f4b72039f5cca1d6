//! In-memory test doubles shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use counsel_types::advisor::{Advisor, AdvisorId, Personality};
use counsel_types::conversation::{Conversation, Message};
use counsel_types::error::{GenerationError, MemoryError, RepositoryError};
use counsel_types::memory::{AgentMemory, MemoryWindow};
use chrono::Utc;
use uuid::Uuid;

use crate::conversation::store::{ConversationStore, TurnCommit};
use crate::memory::store::MemoryStore;
use crate::registry::repository::AdvisorRepository;
use crate::responder::AdvisorResponder;
use crate::responder::box_responder::BoxAdvisorResponder;
use crate::responder::rule_based::reply_for;

pub fn advisor(id: &str, name: &str, expertise: &[&str], position: u32) -> Advisor {
    Advisor {
        id: AdvisorId::from(id),
        name: name.to_string(),
        description: format!("{name} test advisor"),
        personality: Personality::default(),
        expertise: expertise.iter().map(|s| s.to_string()).collect(),
        position,
    }
}

// --- Advisor repository ---

#[derive(Default)]
pub struct FakeAdvisorRepository {
    advisors: Mutex<Vec<Advisor>>,
    seed_calls: AtomicUsize,
}

impl FakeAdvisorRepository {
    pub fn seed_calls(&self) -> usize {
        self.seed_calls.load(Ordering::SeqCst)
    }
}

impl AdvisorRepository for FakeAdvisorRepository {
    async fn list(&self) -> Result<Vec<Advisor>, RepositoryError> {
        let mut advisors = self.advisors.lock().unwrap().clone();
        advisors.sort_by_key(|a| a.position);
        Ok(advisors)
    }

    async fn get(&self, id: &AdvisorId) -> Result<Option<Advisor>, RepositoryError> {
        Ok(self
            .advisors
            .lock()
            .unwrap()
            .iter()
            .find(|a| &a.id == id)
            .cloned())
    }

    async fn seed(&self, advisors: &[Advisor]) -> Result<u64, RepositoryError> {
        self.seed_calls.fetch_add(1, Ordering::SeqCst);
        let mut stored = self.advisors.lock().unwrap();
        let mut inserted = 0;
        for advisor in advisors {
            if !stored.iter().any(|a| a.id == advisor.id) {
                stored.push(advisor.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}

// --- Conversation + memory store ---

#[derive(Default)]
struct State {
    conversations: HashMap<Uuid, Conversation>,
    messages: Vec<Message>,
    memories: Vec<AgentMemory>,
    fail_initialize: bool,
    fail_delete: bool,
}

/// One shared state behind both store traits, like a single database.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Make every `initialize` fail with a storage error.
    pub fn fail_initialize(&self) {
        self.state.lock().unwrap().fail_initialize = true;
    }

    /// Make every `delete_conversation` fail with a storage error.
    pub fn fail_delete(&self) {
        self.state.lock().unwrap().fail_delete = true;
    }
}

fn page<T>(items: Vec<T>, limit: Option<i64>, offset: Option<i64>) -> Vec<T> {
    let offset = offset.unwrap_or(0).max(0) as usize;
    let limit = limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

impl ConversationStore for InMemoryStore {
    async fn create_conversation(&self, conversation: &Conversation) -> Result<Conversation, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.conversations.contains_key(&conversation.id) {
            return Err(RepositoryError::Conflict(conversation.id.to_string()));
        }
        state
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(conversation.clone())
    }

    async fn get_conversation(&self, id: &Uuid) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self.state.lock().unwrap().conversations.get(id).cloned())
    }

    async fn list_conversations(
        &self,
        owner_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut owned: Vec<Conversation> = state
            .conversations
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(page(owned, limit, offset))
    }

    async fn update_conversation(&self, conversation: &Conversation) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        match state.conversations.get_mut(&conversation.id) {
            Some(existing) => {
                *existing = conversation.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete_conversation(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_delete {
            return Err(RepositoryError::Query("disk I/O error".to_string()));
        }
        if state.conversations.remove(id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        state.messages.retain(|m| &m.conversation_id != id);
        state.memories.retain(|m| &m.conversation_id != id);
        Ok(())
    }

    async fn get_messages(
        &self,
        conversation_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Message>, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps.
        messages.sort_by_key(|m| m.created_at);
        Ok(page(messages, limit, offset))
    }

    async fn commit_turn(&self, commit: &TurnCommit) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let Some(conversation) = state.conversations.get_mut(&commit.conversation_id) else {
            return Err(RepositoryError::NotFound);
        };
        conversation.updated_at = commit.updated_at;

        state.messages.push(commit.user_message.clone());
        state.messages.extend(commit.advisor_messages.iter().cloned());
        for memory in &commit.memories {
            upsert_memory(&mut state.memories, memory);
        }
        Ok(())
    }
}

fn upsert_memory(memories: &mut Vec<AgentMemory>, memory: &AgentMemory) {
    match memories.iter_mut().find(|m| {
        m.advisor_id == memory.advisor_id && m.conversation_id == memory.conversation_id
    }) {
        Some(existing) => *existing = memory.clone(),
        None => memories.push(memory.clone()),
    }
}

impl MemoryStore for InMemoryStore {
    async fn initialize(
        &self,
        conversation_id: &Uuid,
        advisor_ids: &[AdvisorId],
    ) -> Result<Vec<AgentMemory>, MemoryError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_initialize {
            return Err(MemoryError::Storage(RepositoryError::Query(
                "disk I/O error".to_string(),
            )));
        }
        if state
            .memories
            .iter()
            .any(|m| &m.conversation_id == conversation_id)
        {
            return Err(MemoryError::DuplicateInitialization(*conversation_id));
        }
        let now = Utc::now();
        let created: Vec<AgentMemory> = advisor_ids
            .iter()
            .map(|id| AgentMemory::empty(id.clone(), *conversation_id, now))
            .collect();
        state.memories.extend(created.iter().cloned());
        Ok(created)
    }

    async fn get_memory(
        &self,
        advisor_id: &AdvisorId,
        conversation_id: &Uuid,
    ) -> Result<Option<AgentMemory>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .memories
            .iter()
            .find(|m| &m.advisor_id == advisor_id && &m.conversation_id == conversation_id)
            .cloned())
    }

    async fn list_memories(&self, conversation_id: &Uuid) -> Result<Vec<AgentMemory>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .memories
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn save_memory(&self, memory: &AgentMemory) -> Result<(), RepositoryError> {
        upsert_memory(&mut self.state.lock().unwrap().memories, memory);
        Ok(())
    }
}

// --- Scripted responder ---

#[derive(Clone)]
pub enum Behavior {
    ReplyAfter(Duration),
    Fail(String),
    Hang,
    Panic,
}

/// Responder whose per-advisor behavior is scripted; unscripted advisors
/// answer immediately with the rule-based reply.
#[derive(Clone, Default)]
pub struct ScriptedResponder {
    behaviors: HashMap<AdvisorId, Behavior>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, advisor_id: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(AdvisorId::from(advisor_id), behavior);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn boxed(self) -> Arc<BoxAdvisorResponder> {
        Arc::new(BoxAdvisorResponder::new(self))
    }
}

impl AdvisorResponder for ScriptedResponder {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn respond(
        &self,
        advisor: &Advisor,
        _user_text: &str,
        _memory: &MemoryWindow,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviors.get(&advisor.id).cloned() {
            None => Ok(reply_for(advisor)),
            Some(Behavior::ReplyAfter(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(reply_for(advisor))
            }
            Some(Behavior::Fail(message)) => Err(GenerationError::Upstream(message)),
            Some(Behavior::Hang) => std::future::pending().await,
            Some(Behavior::Panic) => panic!("scripted panic for {}", advisor.id),
        }
    }
}
