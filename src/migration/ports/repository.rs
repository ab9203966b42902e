//! Repository port for migration aggregate persistence.

use crate::migration::domain::{Migration, MigrationId, MigrationStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for migration repository operations.
pub type MigrationRepositoryResult<T> = Result<T, MigrationRepositoryError>;

/// Migration persistence contract.
#[async_trait]
pub trait MigrationRepository: Send + Sync {
    /// Stores a new migration.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationRepositoryError::DuplicateMigration`] when the
    /// identifier already exists.
    async fn store(&self, migration: &Migration) -> MigrationRepositoryResult<()>;

    /// Persists status, progress, and timestamps of `migration` only if the
    /// stored status still equals `expected`.
    ///
    /// Every state change after creation goes through this compare-and-set,
    /// so a writer holding a stale copy can never overwrite a newer status.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationRepositoryError::StatusConflict`] when another
    /// writer changed the status first, or
    /// [`MigrationRepositoryError::NotFound`] when the migration does not
    /// exist.
    async fn update_guarded(
        &self,
        migration: &Migration,
        expected: MigrationStatus,
    ) -> MigrationRepositoryResult<()>;

    /// Finds a migration by identifier.
    ///
    /// Returns `None` when the migration does not exist.
    async fn find_by_id(&self, id: MigrationId) -> MigrationRepositoryResult<Option<Migration>>;

    /// Returns all migrations, newest first.
    async fn list_all(&self) -> MigrationRepositoryResult<Vec<Migration>>;
}

/// Errors returned by migration repository implementations.
#[derive(Debug, Clone, Error)]
pub enum MigrationRepositoryError {
    /// A migration with the same identifier already exists.
    #[error("duplicate migration identifier: {0}")]
    DuplicateMigration(MigrationId),

    /// The migration was not found.
    #[error("migration not found: {0}")]
    NotFound(MigrationId),

    /// The stored status differs from the status the caller expected.
    #[error("migration {id} status changed concurrently: expected {expected}, found {actual}")]
    StatusConflict {
        /// Migration identifier.
        id: MigrationId,
        /// Status the caller expected.
        expected: MigrationStatus,
        /// Status currently stored.
        actual: MigrationStatus,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MigrationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
