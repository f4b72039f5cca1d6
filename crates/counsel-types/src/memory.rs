//! Per-advisor conversation memory.
//!
//! Each (advisor, conversation) pair owns one [`AgentMemory`]: a versioned
//! record around a [`MemoryWindow`] that never holds more than
//! [`MEMORY_PAIR_CAP`] exchange pairs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::collections::VecDeque;

use crate::advisor::AdvisorId;
use crate::conversation::MessageRole;

/// Maximum number of (user, advisor) pairs kept per memory.
pub const MEMORY_PAIR_CAP: usize = 10;

/// Current schema version written into every persisted memory record.
pub const MEMORY_SCHEMA_VERSION: u32 = 1;

/// One user message and the advisor's reply to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangePair {
    pub user: String,
    pub advisor: String,
    pub at: DateTime<Utc>,
}

/// A single raw memory entry as seen by a responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub role: MessageRole,
    pub content: String,
}

/// FIFO window of exchange pairs bounded by [`MEMORY_PAIR_CAP`].
///
/// Serializes as a plain JSON array. Deserializing an over-long array keeps
/// only the newest pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ExchangePair>", into = "Vec<ExchangePair>")]
pub struct MemoryWindow {
    pairs: VecDeque<ExchangePair>,
}

impl MemoryWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, evicting the oldest ones past the cap.
    pub fn push(&mut self, pair: ExchangePair) {
        self.pairs.push_back(pair);
        while self.pairs.len() > MEMORY_PAIR_CAP {
            self.pairs.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = &ExchangePair> {
        self.pairs.iter()
    }

    /// Flatten into alternating user/advisor entries, oldest first.
    pub fn entries(&self) -> Vec<MemoryEntry> {
        self.pairs
            .iter()
            .flat_map(|pair| {
                [
                    MemoryEntry {
                        role: MessageRole::User,
                        content: pair.user.clone(),
                    },
                    MemoryEntry {
                        role: MessageRole::Advisor,
                        content: pair.advisor.clone(),
                    },
                ]
            })
            .collect()
    }
}

impl From<Vec<ExchangePair>> for MemoryWindow {
    fn from(pairs: Vec<ExchangePair>) -> Self {
        let skip = pairs.len().saturating_sub(MEMORY_PAIR_CAP);
        Self {
            pairs: pairs.into_iter().skip(skip).collect(),
        }
    }
}

impl From<MemoryWindow> for Vec<ExchangePair> {
    fn from(window: MemoryWindow) -> Self {
        window.pairs.into()
    }
}

/// Memory of one advisor within one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMemory {
    pub advisor_id: AdvisorId,
    pub conversation_id: Uuid,
    pub schema_version: u32,
    pub window: MemoryWindow,
    pub updated_at: DateTime<Utc>,
}

impl AgentMemory {
    /// An empty memory, as created by conversation initialization.
    pub fn empty(advisor_id: AdvisorId, conversation_id: Uuid, at: DateTime<Utc>) -> Self {
        Self {
            advisor_id,
            conversation_id,
            schema_version: MEMORY_SCHEMA_VERSION,
            window: MemoryWindow::new(),
            updated_at: at,
        }
    }

    /// Record one exchange and advance `updated_at`.
    pub fn record(&mut self, user: &str, advisor: &str, at: DateTime<Utc>) {
        self.window.push(ExchangePair {
            user: user.to_string(),
            advisor: advisor.to_string(),
            at,
        });
        self.updated_at = at;
    }
}
