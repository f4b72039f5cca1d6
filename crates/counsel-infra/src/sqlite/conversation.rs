//! SQLite conversation store implementation.
//!
//! Implements `ConversationStore` from `counsel-core`. Deleting a
//! conversation cascades to its messages and memories through foreign keys.

use counsel_core::conversation::store::{ConversationStore, TurnCommit};
use counsel_types::advisor::AdvisorId;
use counsel_types::conversation::{Conversation, Message, MessageRole};
use counsel_types::error::RepositoryError;
use sqlx::Row;
use uuid::Uuid;

use super::memory::upsert_memory;
use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `ConversationStore`.
#[derive(Clone)]
pub struct SqliteConversationStore {
    pool: DatabasePool,
}

impl SqliteConversationStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Conversation.
struct ConversationRow {
    id: String,
    owner_id: String,
    title: String,
    created_at: String,
    updated_at: String,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid UUID: {e}")))?;

        Ok(Conversation {
            id,
            owner_id: self.owner_id,
            title: self.title,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain Message.
struct MessageRow {
    id: String,
    conversation_id: String,
    role: String,
    advisor_id: Option<String>,
    content: String,
    created_at: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            advisor_id: row.try_get("advisor_id")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid UUID: {e}")))?;
        let conversation_id = Uuid::parse_str(&self.conversation_id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation_id: {e}")))?;
        let role: MessageRole = self.role.parse().map_err(RepositoryError::Query)?;

        Ok(Message {
            id,
            conversation_id,
            role,
            advisor_id: self.advisor_id.map(AdvisorId::from),
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl ConversationStore for SqliteConversationStore {
    async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Conversation, RepositoryError> {
        let result = sqlx::query(
            r#"INSERT INTO conversations (id, owner_id, title, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(conversation.id.to_string())
        .bind(&conversation.owner_id)
        .bind(&conversation.title)
        .bind(format_datetime(&conversation.created_at))
        .bind(format_datetime(&conversation.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(conversation.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("conversation '{}' already exists", conversation.id)),
            ),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_conversation(&self, id: &Uuid) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM conversations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let conv_row = ConversationRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(conv_row.into_conversation()?))
            }
            None => Ok(None),
        }
    }

    async fn list_conversations(
        &self,
        owner_id: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let limit = limit.unwrap_or(-1);
        let offset = offset.unwrap_or(0);

        let rows = sqlx::query(
            r#"SELECT * FROM conversations
               WHERE owner_id = ?
               ORDER BY updated_at DESC, rowid DESC
               LIMIT ? OFFSET ?"#,
        )
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            let conv_row =
                ConversationRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            conversations.push(conv_row.into_conversation()?);
        }

        Ok(conversations)
    }

    async fn update_conversation(&self, conversation: &Conversation) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE conversations SET title = ?, updated_at = ? WHERE id = ?")
            .bind(&conversation.title)
            .bind(format_datetime(&conversation.updated_at))
            .bind(conversation.id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_conversation(&self, id: &Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn get_messages(
        &self,
        conversation_id: &Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Message>, RepositoryError> {
        let limit = limit.unwrap_or(-1);
        let offset = offset.unwrap_or(0);

        let rows = sqlx::query(
            r#"SELECT * FROM messages
               WHERE conversation_id = ?
               ORDER BY created_at ASC, rowid ASC
               LIMIT ? OFFSET ?"#,
        )
        .bind(conversation_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row =
                MessageRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn commit_turn(&self, commit: &TurnCommit) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&commit.updated_at))
            .bind(commit.conversation_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Err(RepositoryError::NotFound);
        }

        for message in std::iter::once(&commit.user_message).chain(&commit.advisor_messages) {
            sqlx::query(
                r#"INSERT INTO messages (id, conversation_id, role, advisor_id, content, created_at)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(message.id.to_string())
            .bind(message.conversation_id.to_string())
            .bind(message.role.to_string())
            .bind(message.advisor_id.as_ref().map(|a| a.as_str()))
            .bind(&message.content)
            .bind(format_datetime(&message.created_at))
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        for memory in &commit.memories {
            upsert_memory(&mut *tx, memory).await?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tracing::debug!(
            conversation_id = %commit.conversation_id,
            messages = 1 + commit.advisor_messages.len(),
            memories = commit.memories.len(),
            "Turn committed"
        );
        Ok(())
    }
}
