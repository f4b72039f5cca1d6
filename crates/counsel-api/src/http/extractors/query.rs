//! Query parameter extractors for list endpoints.

use serde::Deserialize;

/// Query parameters for the conversation list endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct ConversationListQuery {
    /// Owner whose conversations to list (defaults to the configured owner).
    pub owner_id: Option<String>,
    /// Maximum results.
    pub limit: Option<i64>,
    /// Offset for pagination.
    pub offset: Option<i64>,
}

/// Query parameters for message listing.
#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    #[serde(default = "default_message_limit")]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

fn default_message_limit() -> Option<i64> {
    Some(100)
}
