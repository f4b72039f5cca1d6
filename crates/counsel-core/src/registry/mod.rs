//! Advisor registry: the process-wide, read-only set of advisors.
//!
//! Loaded once at startup from the durable advisor table, seeding it first
//! if it is empty. After loading the registry never changes and is shared
//! by every conversation.

pub mod defaults;
pub mod repository;

use std::sync::Arc;

use counsel_types::advisor::{Advisor, AdvisorId};
use counsel_types::error::RegistryError;
use tracing::{debug, info};

use self::repository::AdvisorRepository;

/// Ordered, immutable advisor list. Clones share the same allocation.
#[derive(Debug, Clone)]
pub struct AdvisorRegistry {
    advisors: Arc<[Advisor]>,
}

impl AdvisorRegistry {
    /// Load the registry from the repository, seeding it when empty.
    ///
    /// Seeding relies on the primary key for idempotency, so two processes
    /// racing on a fresh database end up with one copy of each advisor.
    pub async fn load<R: AdvisorRepository>(
        repo: &R,
        seed: &[Advisor],
    ) -> Result<Self, RegistryError> {
        let existing = repo.list().await?;
        if !existing.is_empty() {
            debug!(count = existing.len(), "Advisor registry loaded");
            return Ok(Self::from_advisors(existing));
        }

        let inserted = repo.seed(&with_positions(seed)).await?;
        info!(inserted, "Advisor table seeded");

        let advisors = repo.list().await?;
        Ok(Self::from_advisors(advisors))
    }

    /// Build a registry directly, ordered by `position` (stable for ties).
    pub fn from_advisors(mut advisors: Vec<Advisor>) -> Self {
        advisors.sort_by_key(|a| a.position);
        Self {
            advisors: advisors.into(),
        }
    }

    pub fn list(&self) -> &[Advisor] {
        &self.advisors
    }

    pub fn get(&self, id: &AdvisorId) -> Result<&Advisor, RegistryError> {
        self.advisors
            .iter()
            .find(|a| &a.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// Index of an advisor in registry order.
    pub fn position(&self, id: &AdvisorId) -> Option<usize> {
        self.advisors.iter().position(|a| &a.id == id)
    }

    pub fn ids(&self) -> Vec<AdvisorId> {
        self.advisors.iter().map(|a| a.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.advisors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advisors.is_empty()
    }
}

/// Renumber a seed list so `position` follows declaration order.
fn with_positions(seed: &[Advisor]) -> Vec<Advisor> {
    seed.iter()
        .enumerate()
        .map(|(i, advisor)| Advisor {
            position: i as u32,
            ..advisor.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::defaults::default_advisors;
    use crate::testing::FakeAdvisorRepository;

    #[tokio::test]
    async fn test_load_seeds_empty_repository() {
        let repo = FakeAdvisorRepository::default();
        let registry = AdvisorRegistry::load(&repo, &default_advisors()).await.unwrap();

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.list()[0].id.as_str(), "warren_buffett");
        assert_eq!(repo.seed_calls(), 1);
    }

    #[tokio::test]
    async fn test_load_skips_seed_when_populated() {
        let repo = FakeAdvisorRepository::default();
        AdvisorRegistry::load(&repo, &default_advisors()).await.unwrap();

        let other_seed = vec![Advisor {
            id: AdvisorId::from("ray_dalio"),
            ..default_advisors()[1].clone()
        }];
        let registry = AdvisorRegistry::load(&repo, &other_seed).await.unwrap();

        assert_eq!(registry.len(), 4);
        assert!(registry.get(&AdvisorId::from("ray_dalio")).is_err());
        assert_eq!(repo.seed_calls(), 1);
    }

    #[tokio::test]
    async fn test_seed_positions_follow_declaration_order() {
        let repo = FakeAdvisorRepository::default();
        let mut seed = default_advisors();
        seed.reverse();
        for advisor in &mut seed {
            advisor.position = 99;
        }

        let registry = AdvisorRegistry::load(&repo, &seed).await.unwrap();
        assert_eq!(registry.list()[0].id.as_str(), "albert_einstein");
        assert_eq!(registry.list()[3].id.as_str(), "warren_buffett");
    }

    #[test]
    fn test_get_and_position() {
        let registry = AdvisorRegistry::from_advisors(default_advisors());
        let keynes = AdvisorId::from("john_keynes");

        assert_eq!(registry.get(&keynes).unwrap().name, "John Maynard Keynes");
        assert_eq!(registry.position(&keynes), Some(1));

        let missing = AdvisorId::from("nobody");
        assert!(matches!(
            registry.get(&missing),
            Err(RegistryError::NotFound(id)) if id == missing
        ));
        assert_eq!(registry.position(&missing), None);
    }

    #[test]
    fn test_from_advisors_sorts_by_position() {
        let mut advisors = default_advisors();
        advisors.swap(0, 3);
        let registry = AdvisorRegistry::from_advisors(advisors);
        let ids: Vec<String> = registry.ids().iter().map(|id| id.to_string()).collect();
        assert_eq!(
            ids,
            vec!["warren_buffett", "john_keynes", "benjamin_graham", "albert_einstein"]
        );
    }
}
