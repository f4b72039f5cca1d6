use thiserror::Error;
use uuid::Uuid;

use crate::advisor::AdvisorId;

/// Errors that reject a whole turn before anything is persisted.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("conversation {0} not found")]
    ConversationNotFound(Uuid),

    #[error("conversation {0} has no initialized advisors")]
    NoAdvisors(Uuid),

    #[error("turn cancelled before commit")]
    Cancelled,

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors related to advisor registry lookups.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("advisor '{0}' not found")]
    NotFound(AdvisorId),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Failure of a single advisor within a turn.
///
/// Never fatal to the turn: the orchestrator records it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("upstream generation failed: {0}")]
    Upstream(String),

    #[error("timed out after {0} ms")]
    TimedOut(u64),

    #[error("response task panicked: {0}")]
    Panicked(String),

    #[error("advisor '{0}' is not registered")]
    UnknownAdvisor(AdvisorId),
}

/// Errors related to per-advisor memory.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("advisors already initialized for conversation {0}")]
    DuplicateInitialization(Uuid),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from conversation management outside of a turn.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("conversation {0} not found")]
    NotFound(Uuid),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from stock analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid symbol: '{0}'")]
    InvalidSymbol(String),

    #[error("quote unavailable: {0}")]
    QuoteUnavailable(String),
}

/// Errors from repository operations (used by trait definitions in counsel-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
