//! SQLite advisor repository implementation.
//!
//! Personality and expertise are stored as JSON text columns.

use counsel_core::registry::repository::AdvisorRepository;
use counsel_types::advisor::{Advisor, AdvisorId, Personality};
use counsel_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `AdvisorRepository`.
pub struct SqliteAdvisorRepository {
    pool: DatabasePool,
}

impl SqliteAdvisorRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Advisor.
struct AdvisorRow {
    id: String,
    name: String,
    description: String,
    personality: String,
    expertise: String,
    position: i64,
}

impl AdvisorRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            personality: row.try_get("personality")?,
            expertise: row.try_get("expertise")?,
            position: row.try_get("position")?,
        })
    }

    fn into_advisor(self) -> Result<Advisor, RepositoryError> {
        let personality: Personality = serde_json::from_str(&self.personality)
            .map_err(|e| RepositoryError::Query(format!("invalid personality JSON: {e}")))?;
        let expertise: Vec<String> = serde_json::from_str(&self.expertise)
            .map_err(|e| RepositoryError::Query(format!("invalid expertise JSON: {e}")))?;

        Ok(Advisor {
            id: AdvisorId::from(self.id),
            name: self.name,
            description: self.description,
            personality,
            expertise,
            position: self.position as u32,
        })
    }
}

impl AdvisorRepository for SqliteAdvisorRepository {
    async fn list(&self) -> Result<Vec<Advisor>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM advisors ORDER BY position ASC, rowid ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut advisors = Vec::with_capacity(rows.len());
        for row in &rows {
            let advisor_row =
                AdvisorRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            advisors.push(advisor_row.into_advisor()?);
        }

        Ok(advisors)
    }

    async fn get(&self, id: &AdvisorId) -> Result<Option<Advisor>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM advisors WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let advisor_row =
                    AdvisorRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(advisor_row.into_advisor()?))
            }
            None => Ok(None),
        }
    }

    async fn seed(&self, advisors: &[Advisor]) -> Result<u64, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut inserted = 0;
        for advisor in advisors {
            let personality = serde_json::to_string(&advisor.personality)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let expertise = serde_json::to_string(&advisor.expertise)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

            let result = sqlx::query(
                r#"INSERT INTO advisors (id, name, description, personality, expertise, position)
                   VALUES (?, ?, ?, ?, ?, ?)
                   ON CONFLICT(id) DO NOTHING"#,
            )
            .bind(advisor.id.as_str())
            .bind(&advisor.name)
            .bind(&advisor.description)
            .bind(&personality)
            .bind(&expertise)
            .bind(advisor.position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::tests::test_pool;
    use counsel_core::registry::AdvisorRegistry;
    use counsel_core::registry::defaults::default_advisors;

    #[tokio::test]
    async fn test_seed_and_list_in_position_order() {
        let repo = SqliteAdvisorRepository::new(test_pool().await);

        let inserted = repo.seed(&default_advisors()).await.unwrap();
        assert_eq!(inserted, 4);

        let advisors = repo.list().await.unwrap();
        let ids: Vec<&str> = advisors.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["warren_buffett", "john_keynes", "benjamin_graham", "albert_einstein"]
        );
        assert_eq!(advisors[0].expertise[0], "value investing");
        assert_eq!(advisors[0].personality, Personality::default());
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let repo = SqliteAdvisorRepository::new(test_pool().await);

        assert_eq!(repo.seed(&default_advisors()).await.unwrap(), 4);
        assert_eq!(repo.seed(&default_advisors()).await.unwrap(), 0);
        assert_eq!(repo.list().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let repo = SqliteAdvisorRepository::new(test_pool().await);
        repo.seed(&default_advisors()).await.unwrap();

        let keynes = repo.get(&AdvisorId::from("john_keynes")).await.unwrap().unwrap();
        assert_eq!(keynes.name, "John Maynard Keynes");
        assert_eq!(keynes.position, 1);

        assert!(repo.get(&AdvisorId::from("nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_registry_load_against_sqlite() {
        let repo = SqliteAdvisorRepository::new(test_pool().await);

        let first = AdvisorRegistry::load(&repo, &default_advisors()).await.unwrap();
        let second = AdvisorRegistry::load(&repo, &[]).await.unwrap();

        assert_eq!(first.len(), 4);
        assert_eq!(first.ids(), second.ids());
    }
}
