//! Advisor repository trait definition.

use counsel_types::advisor::{Advisor, AdvisorId};
use counsel_types::error::RepositoryError;

/// Repository trait for the durable advisor table.
///
/// Implementations live in counsel-infra (e.g., SqliteAdvisorRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait AdvisorRepository: Send + Sync {
    /// All advisors ordered by `position`.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Advisor>, RepositoryError>> + Send;

    /// Get an advisor by its id.
    fn get(
        &self,
        id: &AdvisorId,
    ) -> impl std::future::Future<Output = Result<Option<Advisor>, RepositoryError>> + Send;

    /// Insert advisors whose id is not present yet. Returns how many rows
    /// were inserted; existing ids are left untouched.
    fn seed(
        &self,
        advisors: &[Advisor],
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
