//! Deterministic responder keyed on expertise tags.
//!
//! The reply framing comes from `ExpertiseCategory::classify`, so the rule
//! order is the one declared in `counsel_types::advisor::EXPERTISE_RULES`.

use std::time::Duration;

use counsel_types::advisor::{Advisor, ExpertiseCategory};
use counsel_types::error::GenerationError;
use counsel_types::memory::MemoryWindow;
use tracing::debug;

use super::AdvisorResponder;

/// Rule-based responder with an optional simulated latency.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedResponder {
    latency: Duration,
}

impl RuleBasedResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `latency` inside every `respond` call.
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

/// Reply text for an advisor, selected by its expertise category.
pub fn reply_for(advisor: &Advisor) -> String {
    let name = &advisor.name;
    match advisor.category() {
        ExpertiseCategory::ValueInvesting => format!(
            "As {name}, I would analyze this from a value investing perspective. \
             I'd look at the company's fundamentals, competitive advantages, and \
             whether it's trading at a discount to intrinsic value."
        ),
        ExpertiseCategory::Macroeconomics => format!(
            "From my perspective as {name}, I would consider the macroeconomic factors \
             at play here. How do interest rates, inflation trends, and broader economic \
             cycles affect this situation?"
        ),
        ExpertiseCategory::PatternRecognition => format!(
            "As {name}, I notice interesting patterns here. Let's apply some systematic \
             thinking and consider how these elements interconnect in non-obvious ways."
        ),
        ExpertiseCategory::LongTermPrinciples => format!(
            "As {name}, I would approach this by considering the long-term implications \
             and focusing on the fundamental principles at work."
        ),
    }
}

impl AdvisorResponder for RuleBasedResponder {
    fn name(&self) -> &str {
        "rule_based"
    }

    async fn respond(
        &self,
        advisor: &Advisor,
        _user_text: &str,
        memory: &MemoryWindow,
    ) -> Result<String, GenerationError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        debug!(
            advisor_id = %advisor.id,
            memory_pairs = memory.len(),
            "Rule-based reply selected"
        );
        Ok(reply_for(advisor))
    }
}
