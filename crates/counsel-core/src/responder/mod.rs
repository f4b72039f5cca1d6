//! Advisor response capability.
//!
//! An `AdvisorResponder` turns (advisor, user text, memory) into reply
//! text. The turn orchestrator calls it once per advisor per turn and
//! treats every error as isolated to that advisor.

pub mod box_responder;
pub mod rule_based;

use counsel_types::advisor::Advisor;
use counsel_types::error::GenerationError;
use counsel_types::memory::MemoryWindow;

/// Trait for anything that can produce an advisor's reply.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). Not object
/// safe; use [`box_responder::BoxAdvisorResponder`] for dynamic dispatch.
pub trait AdvisorResponder: Send + Sync {
    /// Human-readable backend name (e.g., "rule_based").
    fn name(&self) -> &str;

    /// Produce the advisor's reply to `user_text`.
    ///
    /// `memory` is the advisor's window before this turn.
    fn respond(
        &self,
        advisor: &Advisor,
        user_text: &str,
        memory: &MemoryWindow,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;
}
