//! Turn orchestrator for Counsel.
//!
//! `TurnOrchestrator` runs one conversation turn through its states:
//! Received (validation), Dispatched (one `JoinSet` task per advisor, each
//! under its own timeout), Aggregated (per-advisor failure isolation), and
//! Committed (one atomic store write). Rejections and cancellation leave
//! storage untouched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use counsel_types::advisor::AdvisorId;
use counsel_types::config::GlobalConfig;
use counsel_types::conversation::Message;
use counsel_types::error::{GenerationError, TurnError};
use counsel_types::turn::{AdvisorFailure, AdvisorReply, TurnOutcome};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::conversation::store::{ConversationStore, TurnCommit};
use crate::memory::store::MemoryStore;
use crate::registry::AdvisorRegistry;
use crate::responder::box_responder::BoxAdvisorResponder;
use crate::turn::locks::ConversationLocks;

/// Tunables for a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnConfig {
    /// Per-advisor response timeout.
    pub timeout: Duration,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TurnConfig {
    pub fn from_global(config: &GlobalConfig) -> Self {
        Self {
            timeout: config.turn_timeout(),
        }
    }
}

type TaskOutput = (AdvisorId, Result<String, GenerationError>);

/// Executes one turn against explicit handles.
///
/// Constructed per request; holds no state of its own between turns.
pub struct TurnOrchestrator<'a, C: ConversationStore, M: MemoryStore> {
    registry: &'a AdvisorRegistry,
    conversations: &'a C,
    memories: &'a M,
    responder: Arc<BoxAdvisorResponder>,
    locks: &'a ConversationLocks,
    config: TurnConfig,
}

impl<'a, C: ConversationStore, M: MemoryStore> TurnOrchestrator<'a, C, M> {
    pub fn new(
        registry: &'a AdvisorRegistry,
        conversations: &'a C,
        memories: &'a M,
        responder: Arc<BoxAdvisorResponder>,
        locks: &'a ConversationLocks,
        config: TurnConfig,
    ) -> Self {
        Self {
            registry,
            conversations,
            memories,
            responder,
            locks,
            config,
        }
    }

    /// Run one turn.
    ///
    /// Cancelling `cancel`, or dropping the returned future, before the
    /// commit aborts every outstanding advisor task and persists nothing.
    pub async fn run(
        &self,
        conversation_id: Uuid,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, TurnError> {
        let span = info_span!(
            "turn",
            conversation_id = %conversation_id,
            responder = self.responder.name(),
        );
        self.run_locked(conversation_id, user_text, cancel)
            .instrument(span)
            .await
    }

    async fn run_locked(
        &self,
        conversation_id: Uuid,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, TurnError> {
        // --- Received ---
        // Rejections happen before the lock so unknown ids never get an entry.
        let text = user_text.trim();
        if text.is_empty() {
            return Err(TurnError::Validation(
                "message content must not be empty".to_string(),
            ));
        }
        if self.conversations.get_conversation(&conversation_id).await?.is_none() {
            return Err(TurnError::ConversationNotFound(conversation_id));
        }

        let _guard = tokio::select! {
            _ = cancel.cancelled() => return Err(TurnError::Cancelled),
            guard = self.locks.acquire(conversation_id) => guard,
        };

        // A delete may have landed while we waited.
        if self.conversations.get_conversation(&conversation_id).await?.is_none() {
            self.locks.remove(&conversation_id);
            return Err(TurnError::ConversationNotFound(conversation_id));
        }
        let memories = self.memories.list_memories(&conversation_id).await?;
        if memories.is_empty() {
            return Err(TurnError::NoAdvisors(conversation_id));
        }

        // --- Dispatched ---
        let started = Instant::now();
        let mut failures: Vec<(AdvisorId, GenerationError)> = Vec::new();
        let mut pending: HashSet<AdvisorId> = HashSet::new();
        let mut set: JoinSet<TaskOutput> = JoinSet::new();

        for memory in &memories {
            let advisor = match self.registry.get(&memory.advisor_id) {
                Ok(advisor) => advisor.clone(),
                Err(_) => {
                    warn!(advisor_id = %memory.advisor_id, "Memory references unregistered advisor");
                    failures.push((
                        memory.advisor_id.clone(),
                        GenerationError::UnknownAdvisor(memory.advisor_id.clone()),
                    ));
                    continue;
                }
            };

            let responder = Arc::clone(&self.responder);
            let window = memory.window.clone();
            let text = text.to_string();
            let timeout = self.config.timeout;
            pending.insert(advisor.id.clone());

            set.spawn(async move {
                let result =
                    match tokio::time::timeout(timeout, responder.respond(&advisor, &text, &window))
                        .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(GenerationError::TimedOut(timeout.as_millis() as u64)),
                    };
                (advisor.id, result)
            });
        }
        debug!(dispatched = pending.len(), "Advisor tasks dispatched");

        // --- Aggregated ---
        let mut replies: HashMap<AdvisorId, String> = HashMap::new();
        let mut panics: Vec<String> = Vec::new();

        loop {
            let joined = tokio::select! {
                _ = cancel.cancelled() => {
                    set.abort_all();
                    info!(outstanding = set.len(), "Turn cancelled before commit");
                    return Err(TurnError::Cancelled);
                }
                joined = set.join_next() => joined,
            };

            match joined {
                None => break,
                Some(Ok((advisor_id, Ok(reply)))) => {
                    pending.remove(&advisor_id);
                    replies.insert(advisor_id, reply);
                }
                Some(Ok((advisor_id, Err(error)))) => {
                    warn!(advisor_id = %advisor_id, error = %error, "Advisor failed to respond");
                    pending.remove(&advisor_id);
                    failures.push((advisor_id, error));
                }
                Some(Err(join_error)) => {
                    // A JoinError here means the task panicked; which advisor
                    // it belonged to is whatever is still pending afterwards.
                    warn!(error = %join_error, "Advisor task panicked");
                    panics.push(join_error.to_string());
                }
            }
        }

        for advisor_id in pending {
            failures.push((advisor_id, GenerationError::Panicked(panics.join("; "))));
        }

        // --- Committed ---
        if cancel.is_cancelled() {
            return Err(TurnError::Cancelled);
        }

        let now = Utc::now();
        let user_message = Message::user(conversation_id, text, now);
        let mut responses = Vec::with_capacity(replies.len());
        let mut advisor_messages = Vec::with_capacity(replies.len());
        let mut updated_memories = Vec::with_capacity(replies.len());

        for advisor in self.registry.list() {
            let Some(reply) = replies.remove(&advisor.id) else {
                continue;
            };
            let message = Message::advisor(conversation_id, advisor.id.clone(), reply, now);

            if let Some(memory) = memories.iter().find(|m| m.advisor_id == advisor.id) {
                let mut memory = memory.clone();
                memory.record(text, &message.content, now);
                updated_memories.push(memory);
            }

            responses.push(AdvisorReply {
                advisor_id: advisor.id.clone(),
                advisor_name: advisor.name.clone(),
                message: message.clone(),
            });
            advisor_messages.push(message);
        }

        failures.sort_by(|(a, _), (b, _)| {
            let pa = self.registry.position(a).unwrap_or(usize::MAX);
            let pb = self.registry.position(b).unwrap_or(usize::MAX);
            pa.cmp(&pb).then_with(|| a.cmp(b))
        });

        let commit = TurnCommit {
            conversation_id,
            user_message: user_message.clone(),
            advisor_messages,
            memories: updated_memories,
            updated_at: now,
        };
        self.conversations.commit_turn(&commit).await?;

        info!(
            responses = responses.len(),
            failures = failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Turn committed"
        );

        Ok(TurnOutcome {
            user_message,
            responses,
            failures: failures
                .into_iter()
                .map(|(advisor_id, error)| AdvisorFailure {
                    advisor_id,
                    error: error.to_string(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::store::MemoryStore;
    use crate::testing::{Behavior, InMemoryStore, ScriptedResponder, advisor};
    use counsel_types::conversation::{Conversation, MessageRole};
    use counsel_types::memory::MEMORY_PAIR_CAP;

    fn board() -> AdvisorRegistry {
        AdvisorRegistry::from_advisors(vec![
            advisor("a", "Alice", &["value"], 0),
            advisor("b", "Bob", &["macro"], 1),
            advisor("c", "Carol", &["pattern"], 2),
        ])
    }

    async fn setup(registry: &AdvisorRegistry) -> (InMemoryStore, Uuid) {
        let store = InMemoryStore::default();
        let conversation = Conversation::new("default_user", None);
        store.create_conversation(&conversation).await.unwrap();
        store.initialize(&conversation.id, &registry.ids()).await.unwrap();
        (store, conversation.id)
    }

    fn config(ms: u64) -> TurnConfig {
        TurnConfig {
            timeout: Duration::from_millis(ms),
        }
    }

    async fn run_turn(
        registry: &AdvisorRegistry,
        store: &InMemoryStore,
        responder: Arc<BoxAdvisorResponder>,
        conversation_id: Uuid,
        text: &str,
        turn_config: TurnConfig,
    ) -> Result<TurnOutcome, TurnError> {
        let locks = ConversationLocks::new();
        TurnOrchestrator::new(registry, store, store, responder, &locks, turn_config)
            .run(conversation_id, text, &CancellationToken::new())
            .await
    }

    #[tokio::test]
    async fn test_all_advisors_answer_in_registry_order() {
        let registry = board();
        let (store, conv) = setup(&registry).await;
        // Reverse completion order: c finishes first, a last.
        let responder = ScriptedResponder::new()
            .with("a", Behavior::ReplyAfter(Duration::from_millis(60)))
            .with("b", Behavior::ReplyAfter(Duration::from_millis(30)))
            .with("c", Behavior::ReplyAfter(Duration::from_millis(0)))
            .boxed();

        let outcome = run_turn(&registry, &store, responder, conv, "  Evaluate XYZ ", config(2_000))
            .await
            .unwrap();

        let order: Vec<&str> = outcome.responses.iter().map(|r| r.advisor_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.user_message.content, "Evaluate XYZ");
        assert!(outcome.responses[0].message.content.contains("value investing perspective"));
        assert!(outcome.responses[1].message.content.contains("macroeconomic factors"));
        assert!(outcome.responses[2].message.content.contains("interesting patterns"));

        let messages = store.get_messages(&conv, None, None).await.unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, MessageRole::User);
        let stored: Vec<&str> = messages[1..]
            .iter()
            .map(|m| m.advisor_id.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(stored, vec!["a", "b", "c"]);

        for memory in store.list_memories(&conv).await.unwrap() {
            assert_eq!(memory.window.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_failing_and_slow_advisors_are_isolated() {
        let registry = board();
        let (store, conv) = setup(&registry).await;
        let responder = ScriptedResponder::new()
            .with("a", Behavior::Fail("upstream 503".to_string()))
            .with("b", Behavior::Hang)
            .boxed();

        let started = Instant::now();
        let outcome = run_turn(&registry, &store, responder, conv, "Evaluate XYZ", config(150))
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));

        let answered: Vec<&str> = outcome.responses.iter().map(|r| r.advisor_id.as_str()).collect();
        assert_eq!(answered, vec!["c"]);

        let failed: Vec<&str> = outcome.failures.iter().map(|f| f.advisor_id.as_str()).collect();
        assert_eq!(failed, vec!["a", "b"]);
        assert!(outcome.failures[0].error.contains("upstream 503"));
        assert!(outcome.failures[1].error.contains("timed out after 150 ms"));

        let memories = store.list_memories(&conv).await.unwrap();
        let advanced: Vec<&str> = memories
            .iter()
            .filter(|m| m.window.len() == 1)
            .map(|m| m.advisor_id.as_str())
            .collect();
        assert_eq!(advanced, vec!["c"]);
        assert_eq!(store.get_messages(&conv, None, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_panicking_advisor_is_recorded() {
        let registry = board();
        let (store, conv) = setup(&registry).await;
        let responder = ScriptedResponder::new().with("b", Behavior::Panic).boxed();

        let outcome = run_turn(&registry, &store, responder, conv, "Evaluate XYZ", config(2_000))
            .await
            .unwrap();

        assert_eq!(outcome.responses.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].advisor_id.as_str(), "b");
        assert!(outcome.failures[0].error.contains("panicked"));
    }

    #[tokio::test]
    async fn test_unregistered_advisor_memory_is_a_failure() {
        let registry = board();
        let (store, conv) = setup(&registry).await;
        store
            .save_memory(&counsel_types::memory::AgentMemory::empty(
                AdvisorId::from("ghost"),
                conv,
                Utc::now(),
            ))
            .await
            .unwrap();

        let outcome = run_turn(
            &registry,
            &store,
            ScriptedResponder::new().boxed(),
            conv,
            "Evaluate XYZ",
            config(2_000),
        )
        .await
        .unwrap();

        assert_eq!(outcome.responses.len(), 3);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].advisor_id.as_str(), "ghost");
        assert!(outcome.failures[0].error.contains("not registered"));
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_without_side_effects() {
        let registry = board();
        let (store, conv) = setup(&registry).await;
        let scripted = ScriptedResponder::new();
        let calls = scripted.calls();

        let err = run_turn(&registry, &store, scripted.boxed(), conv, "   \n", config(2_000))
            .await
            .unwrap_err();

        assert!(matches!(err, TurnError::Validation(_)));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(store.get_messages(&conv, None, None).await.unwrap().is_empty());
        assert!(store.list_memories(&conv).await.unwrap().iter().all(|m| m.window.is_empty()));
    }

    #[tokio::test]
    async fn test_unknown_conversation_is_rejected() {
        let registry = board();
        let store = InMemoryStore::default();
        let missing = Uuid::now_v7();

        let err = run_turn(&registry, &store, ScriptedResponder::new().boxed(), missing, "hi", config(2_000))
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::ConversationNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_rejected_turns_leave_no_lock_entries() {
        let registry = board();
        let (store, conv) = setup(&registry).await;
        let locks = ConversationLocks::new();
        let responder = ScriptedResponder::new().boxed();
        let orchestrator =
            TurnOrchestrator::new(&registry, &store, &store, responder, &locks, config(2_000));
        let cancel = CancellationToken::new();

        for _ in 0..20 {
            let err = orchestrator.run(Uuid::now_v7(), "hi", &cancel).await.unwrap_err();
            assert!(matches!(err, TurnError::ConversationNotFound(_)));
        }
        let err = orchestrator.run(conv, "  ", &cancel).await.unwrap_err();
        assert!(matches!(err, TurnError::Validation(_)));

        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected_without_waiting_for_the_lock() {
        let registry = board();
        let (store, conv) = setup(&registry).await;
        let locks = ConversationLocks::new();
        let _held = locks.acquire(conv).await;
        let orchestrator = TurnOrchestrator::new(
            &registry,
            &store,
            &store,
            ScriptedResponder::new().boxed(),
            &locks,
            config(2_000),
        );

        let result = tokio::time::timeout(
            Duration::from_millis(100),
            orchestrator.run(conv, "   ", &CancellationToken::new()),
        )
        .await
        .expect("blank text should not queue behind the lock");
        assert!(matches!(result, Err(TurnError::Validation(_))));
    }

    #[tokio::test]
    async fn test_conversation_without_advisors_is_rejected() {
        let registry = board();
        let store = InMemoryStore::default();
        let conversation = Conversation::new("default_user", None);
        store.create_conversation(&conversation).await.unwrap();

        let err = run_turn(
            &registry,
            &store,
            ScriptedResponder::new().boxed(),
            conversation.id,
            "hi",
            config(2_000),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TurnError::NoAdvisors(_)));
    }

    #[tokio::test]
    async fn test_cancellation_persists_nothing() {
        let registry = board();
        let (store, conv) = setup(&registry).await;
        let responder = ScriptedResponder::new().with("c", Behavior::Hang).boxed();
        let locks = ConversationLocks::new();
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = TurnOrchestrator::new(&registry, &store, &store, responder, &locks, config(5_000))
            .run(conv, "Evaluate XYZ", &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, TurnError::Cancelled));
        assert!(store.get_messages(&conv, None, None).await.unwrap().is_empty());
        assert!(store.list_memories(&conv).await.unwrap().iter().all(|m| m.window.is_empty()));
    }

    #[tokio::test]
    async fn test_dropped_turn_persists_nothing() {
        let registry = board();
        let (store, conv) = setup(&registry).await;
        let responder = ScriptedResponder::new().with("a", Behavior::Hang).boxed();
        let locks = ConversationLocks::new();
        let cancel = CancellationToken::new();
        let orchestrator =
            TurnOrchestrator::new(&registry, &store, &store, responder, &locks, config(5_000));

        let result = tokio::time::timeout(
            Duration::from_millis(50),
            orchestrator.run(conv, "Evaluate XYZ", &cancel),
        )
        .await;

        assert!(result.is_err());
        assert!(store.get_messages(&conv, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_stays_bounded_across_turns() {
        let registry = board();
        let (store, conv) = setup(&registry).await;
        let responder = ScriptedResponder::new().boxed();

        for n in 0..(MEMORY_PAIR_CAP + 2) {
            run_turn(
                &registry,
                &store,
                Arc::clone(&responder),
                conv,
                &format!("turn {n}"),
                config(2_000),
            )
            .await
            .unwrap();
        }

        for memory in store.list_memories(&conv).await.unwrap() {
            assert_eq!(memory.window.len(), MEMORY_PAIR_CAP);
            assert_eq!(memory.window.pairs().next().unwrap().user, "turn 2");
        }
        let messages = store.get_messages(&conv, None, None).await.unwrap();
        assert_eq!(messages.len(), (MEMORY_PAIR_CAP + 2) * 4);
    }

    #[tokio::test]
    async fn test_concurrent_turns_on_one_conversation_serialize() {
        let registry = board();
        let (store, conv) = setup(&registry).await;
        let responder = ScriptedResponder::new()
            .with("a", Behavior::ReplyAfter(Duration::from_millis(20)))
            .boxed();
        let locks = ConversationLocks::new();
        let cancel = CancellationToken::new();

        let first = TurnOrchestrator::new(
            &registry,
            &store,
            &store,
            Arc::clone(&responder),
            &locks,
            config(2_000),
        );
        let second = TurnOrchestrator::new(&registry, &store, &store, responder, &locks, config(2_000));

        let (r1, r2) = tokio::join!(
            first.run(conv, "first", &cancel),
            second.run(conv, "second", &cancel)
        );
        r1.unwrap();
        r2.unwrap();

        for memory in store.list_memories(&conv).await.unwrap() {
            assert_eq!(memory.window.len(), 2);
        }
        let messages = store.get_messages(&conv, None, None).await.unwrap();
        let users: Vec<usize> = messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.role == MessageRole::User)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(users, vec![0, 4]);
    }
}
