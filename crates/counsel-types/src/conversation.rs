//! Conversation and message types for Counsel.
//!
//! A conversation is a shared thread between one owner and every
//! registered advisor. Messages are append-only and ordered by
//! `created_at`, ties broken by insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::advisor::AdvisorId;

/// Title given to conversations created without one.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New Conversation";

/// A conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Advances on every accepted turn.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Build a fresh conversation with a UUID v7 id.
    pub fn new(owner_id: impl Into<String>, title: Option<String>) -> Self {
        let now = Utc::now();
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_CONVERSATION_TITLE.to_string());
        Self {
            id: Uuid::now_v7(),
            owner_id: owner_id.into(),
            title,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Who authored a message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'advisor'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Advisor,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Advisor => write!(f, "advisor"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "advisor" => Ok(MessageRole::Advisor),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single message within a conversation.
///
/// `advisor_id` is present iff `role` is [`MessageRole::Advisor`]; the
/// constructors below are the only way the crate builds messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisor_id: Option<AdvisorId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(conversation_id: Uuid, content: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            conversation_id,
            role: MessageRole::User,
            advisor_id: None,
            content: content.into(),
            created_at: at,
        }
    }

    pub fn advisor(
        conversation_id: Uuid,
        advisor_id: AdvisorId,
        content: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            conversation_id,
            role: MessageRole::Advisor,
            advisor_id: Some(advisor_id),
            content: content.into(),
            created_at: at,
        }
    }
}

/// Request body for creating a conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    pub owner_id: Option<String>,
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::User, MessageRole::Advisor] {
            let parsed: MessageRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("assistant".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_new_conversation_defaults_title() {
        let conv = Conversation::new("default_user", None);
        assert_eq!(conv.title, DEFAULT_CONVERSATION_TITLE);
        assert_eq!(conv.created_at, conv.updated_at);

        let blank = Conversation::new("default_user", Some("   ".to_string()));
        assert_eq!(blank.title, DEFAULT_CONVERSATION_TITLE);

        let titled = Conversation::new("u1", Some(" Retirement plan ".to_string()));
        assert_eq!(titled.title, "Retirement plan");
    }

    #[test]
    fn test_message_constructors_set_advisor_id_by_role() {
        let conv_id = Uuid::now_v7();
        let now = Utc::now();

        let user = Message::user(conv_id, "Evaluate XYZ", now);
        assert_eq!(user.role, MessageRole::User);
        assert!(user.advisor_id.is_none());

        let reply = Message::advisor(conv_id, AdvisorId::from("john_keynes"), "Cycles.", now);
        assert_eq!(reply.role, MessageRole::Advisor);
        assert_eq!(reply.advisor_id.as_ref().map(|a| a.as_str()), Some("john_keynes"));
    }

    #[test]
    fn test_user_message_omits_advisor_id_in_json() {
        let msg = Message::user(Uuid::now_v7(), "hi", Utc::now());
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(!json.contains("advisor_id"));
    }
}
