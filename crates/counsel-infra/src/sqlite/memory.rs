//! SQLite agent memory store implementation.
//!
//! Implements `MemoryStore` from `counsel-core`. The bounded window is
//! stored as a JSON array in `advisor_memories.pairs`; decoding it goes
//! through `MemoryWindow`, which drops pairs beyond the cap.

use counsel_core::memory::store::MemoryStore;
use counsel_types::advisor::AdvisorId;
use counsel_types::error::{MemoryError, RepositoryError};
use counsel_types::memory::{AgentMemory, MemoryWindow};
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::SqliteConnection;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime};

/// SQLite-backed implementation of `MemoryStore`.
#[derive(Clone)]
pub struct SqliteMemoryStore {
    pool: DatabasePool,
}

impl SqliteMemoryStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain AgentMemory.
struct MemoryRow {
    advisor_id: String,
    conversation_id: String,
    schema_version: i64,
    pairs: String,
    updated_at: String,
}

impl MemoryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            advisor_id: row.try_get("advisor_id")?,
            conversation_id: row.try_get("conversation_id")?,
            schema_version: row.try_get("schema_version")?,
            pairs: row.try_get("pairs")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_memory(self) -> Result<AgentMemory, RepositoryError> {
        let conversation_id = Uuid::parse_str(&self.conversation_id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation_id: {e}")))?;
        let window: MemoryWindow = serde_json::from_str(&self.pairs)
            .map_err(|e| RepositoryError::Query(format!("invalid memory window JSON: {e}")))?;

        Ok(AgentMemory {
            advisor_id: AdvisorId::from(self.advisor_id),
            conversation_id,
            schema_version: self.schema_version as u32,
            window,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

/// Insert or replace one memory row on an open connection or transaction.
pub(crate) async fn upsert_memory(
    conn: &mut SqliteConnection,
    memory: &AgentMemory,
) -> Result<(), RepositoryError> {
    let pairs =
        serde_json::to_string(&memory.window).map_err(|e| RepositoryError::Query(e.to_string()))?;

    sqlx::query(
        r#"INSERT INTO advisor_memories (advisor_id, conversation_id, schema_version, pairs, updated_at)
           VALUES (?, ?, ?, ?, ?)
           ON CONFLICT(advisor_id, conversation_id) DO UPDATE
           SET schema_version = excluded.schema_version,
               pairs = excluded.pairs,
               updated_at = excluded.updated_at"#,
    )
    .bind(memory.advisor_id.as_str())
    .bind(memory.conversation_id.to_string())
    .bind(memory.schema_version as i64)
    .bind(&pairs)
    .bind(format_datetime(&memory.updated_at))
    .execute(&mut *conn)
    .await
    .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(())
}

impl MemoryStore for SqliteMemoryStore {
    async fn initialize(
        &self,
        conversation_id: &Uuid,
        advisor_ids: &[AdvisorId],
    ) -> Result<Vec<AgentMemory>, MemoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let row = sqlx::query("SELECT COUNT(*) as cnt FROM advisor_memories WHERE conversation_id = ?")
            .bind(conversation_id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let existing: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        if existing > 0 {
            return Err(MemoryError::DuplicateInitialization(*conversation_id));
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(advisor_ids.len());
        for advisor_id in advisor_ids {
            let memory = AgentMemory::empty(advisor_id.clone(), *conversation_id, now);
            let result = sqlx::query(
                r#"INSERT INTO advisor_memories (advisor_id, conversation_id, schema_version, pairs, updated_at)
                   VALUES (?, ?, ?, '[]', ?)"#,
            )
            .bind(memory.advisor_id.as_str())
            .bind(conversation_id.to_string())
            .bind(memory.schema_version as i64)
            .bind(format_datetime(&now))
            .execute(&mut *tx)
            .await;

            match result {
                Ok(_) => created.push(memory),
                Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                    return Err(MemoryError::DuplicateInitialization(*conversation_id));
                }
                Err(e) => return Err(RepositoryError::Query(e.to_string()).into()),
            }
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tracing::debug!(
            conversation_id = %conversation_id,
            advisors = created.len(),
            "Advisor memories initialized"
        );
        Ok(created)
    }

    async fn get_memory(
        &self,
        advisor_id: &AdvisorId,
        conversation_id: &Uuid,
    ) -> Result<Option<AgentMemory>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM advisor_memories WHERE advisor_id = ? AND conversation_id = ?",
        )
        .bind(advisor_id.as_str())
        .bind(conversation_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let memory_row =
                    MemoryRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(memory_row.into_memory()?))
            }
            None => Ok(None),
        }
    }

    async fn list_memories(&self, conversation_id: &Uuid) -> Result<Vec<AgentMemory>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM advisor_memories WHERE conversation_id = ? ORDER BY rowid ASC",
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut memories = Vec::with_capacity(rows.len());
        for row in &rows {
            let memory_row =
                MemoryRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            memories.push(memory_row.into_memory()?);
        }

        Ok(memories)
    }

    async fn save_memory(&self, memory: &AgentMemory) -> Result<(), RepositoryError> {
        let mut conn = self
            .pool
            .writer
            .acquire()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        upsert_memory(&mut *conn, memory).await
    }
}
