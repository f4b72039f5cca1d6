//! Conversation HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/conversations               - List an owner's conversations
//! - POST   /api/v1/conversations               - Create a conversation
//! - GET    /api/v1/conversations/{id}          - Get a single conversation
//! - PATCH  /api/v1/conversations/{id}          - Rename a conversation
//! - DELETE /api/v1/conversations/{id}          - Delete with messages and memory
//! - GET    /api/v1/conversations/{id}/messages - Ordered message history
//! - POST   /api/v1/conversations/{id}/messages - Run one turn
//! - GET    /api/v1/conversations/{id}/memory   - Per-advisor memory records

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use counsel_types::conversation::{Conversation, CreateConversationRequest, Message};
use counsel_types::memory::AgentMemory;
use counsel_types::turn::{SendMessageRequest, TurnOutcome};

use crate::http::error::AppError;
use crate::http::extractors::query::{ConversationListQuery, MessageListQuery};
use crate::http::handlers::parse_uuid;
use crate::http::response::{ApiResponse, RequestClock};
use crate::state::AppState;

/// Request body for renaming a conversation.
#[derive(Debug, Deserialize)]
pub struct UpdateConversationRequest {
    pub title: String,
}

/// GET /api/v1/conversations - List conversations, most recently updated first.
pub async fn list_conversations(
    State(state): State<AppState>,
    Query(query): Query<ConversationListQuery>,
) -> Result<ApiResponse<Vec<Conversation>>, AppError> {
    let clock = RequestClock::start();
    let owner_id = state.owner_or_default(query.owner_id);

    let conversations = state
        .conversation_service
        .list_conversations(&owner_id, query.limit, query.offset)
        .await?;

    Ok(clock
        .success(conversations)
        .with_link("self", &format!("/api/v1/conversations?owner_id={owner_id}")))
}

/// POST /api/v1/conversations - Create a conversation with every advisor.
pub async fn create_conversation(
    State(state): State<AppState>,
    body: Option<Json<CreateConversationRequest>>,
) -> Result<ApiResponse<Conversation>, AppError> {
    let clock = RequestClock::start();
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let owner_id = state.owner_or_default(body.owner_id);

    let conversation = state
        .conversation_service
        .create_conversation(&owner_id, body.title)
        .await?;

    let base = format!("/api/v1/conversations/{}", conversation.id);
    Ok(clock
        .success(conversation)
        .with_status(StatusCode::CREATED)
        .with_link("self", &base)
        .with_link("messages", &format!("{base}/messages"))
        .with_link("memory", &format!("{base}/memory")))
}

/// GET /api/v1/conversations/{id} - Get a conversation by ID.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Conversation>, AppError> {
    let clock = RequestClock::start();
    let id = parse_uuid(&id)?;

    let conversation = state.conversation_service.get_conversation(&id).await?;

    let base = format!("/api/v1/conversations/{id}");
    Ok(clock
        .success(conversation)
        .with_link("self", &base)
        .with_link("messages", &format!("{base}/messages")))
}

/// PATCH /api/v1/conversations/{id} - Rename a conversation.
pub async fn update_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateConversationRequest>,
) -> Result<ApiResponse<Conversation>, AppError> {
    let clock = RequestClock::start();
    let id = parse_uuid(&id)?;

    let conversation = state
        .conversation_service
        .rename_conversation(&id, &body.title)
        .await?;

    Ok(clock
        .success(conversation)
        .with_link("self", &format!("/api/v1/conversations/{id}")))
}

/// DELETE /api/v1/conversations/{id} - Delete a conversation and everything it owns.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let clock = RequestClock::start();
    let id = parse_uuid(&id)?;

    state.conversation_service.delete_conversation(&id).await?;

    Ok(clock.success(serde_json::json!({"deleted": true, "conversation_id": id})))
}

/// GET /api/v1/conversations/{id}/messages - Messages in conversation order.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MessageListQuery>,
) -> Result<ApiResponse<Vec<Message>>, AppError> {
    let clock = RequestClock::start();
    let id = parse_uuid(&id)?;

    let messages = state
        .conversation_service
        .get_messages(&id, query.limit, query.offset)
        .await?;

    Ok(clock
        .success(messages)
        .with_link("self", &format!("/api/v1/conversations/{id}/messages"))
        .with_link("conversation", &format!("/api/v1/conversations/{id}")))
}

/// POST /api/v1/conversations/{id}/messages - Send a message to every advisor.
///
/// If the client disconnects, axum drops this future; the drop guard then
/// cancels the turn and nothing is persisted.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<ApiResponse<TurnOutcome>, AppError> {
    let clock = RequestClock::start();
    let id = parse_uuid(&id)?;

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let outcome = state
        .conversation_service
        .send_message(id, &body.content, &cancel)
        .await?;

    Ok(clock
        .success(outcome)
        .with_link("messages", &format!("/api/v1/conversations/{id}/messages"))
        .with_link("memory", &format!("/api/v1/conversations/{id}/memory")))
}

/// GET /api/v1/conversations/{id}/memory - Memory records in registry order.
pub async fn get_memory(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<AgentMemory>>, AppError> {
    let clock = RequestClock::start();
    let id = parse_uuid(&id)?;

    let memories = state.conversation_service.advisor_memories(&id).await?;

    Ok(clock
        .success(memories)
        .with_link("self", &format!("/api/v1/conversations/{id}/memory")))
}
