//! Input and output shapes of a conversation turn.

use serde::{Deserialize, Serialize};

use crate::advisor::AdvisorId;
use crate::conversation::Message;

/// Request body for posting a user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// One advisor's successful reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorReply {
    pub advisor_id: AdvisorId,
    pub advisor_name: String,
    pub message: Message,
}

/// One advisor that produced no message this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorFailure {
    pub advisor_id: AdvisorId,
    pub error: String,
}

/// Result of a committed turn.
///
/// `responses` is in registry order. `failures` is sorted the same way,
/// with advisors unknown to the registry at the end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub user_message: Message,
    pub responses: Vec<AdvisorReply>,
    pub failures: Vec<AdvisorFailure>,
}
