//! Ledger ports for mapping records and task outcomes.

use crate::migration::domain::{
    MappingKind, MappingRecord, MigrationId, Resolution, TaskOutcomeRecord,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for mapping ledger operations.
pub type MappingLedgerResult<T> = Result<T, MappingLedgerError>;

/// Result type for task outcome ledger operations.
pub type TaskOutcomeLedgerResult<T> = Result<T, TaskOutcomeLedgerError>;

/// Persisted translation table for discovered source values.
#[async_trait]
pub trait MappingLedger: Send + Sync {
    /// Inserts pending records, skipping any whose
    /// (migration, kind, source value) already exists.
    ///
    /// Returns the number of records actually inserted. Existing records,
    /// resolved or not, are left untouched.
    async fn insert_pending(&self, records: &[MappingRecord]) -> MappingLedgerResult<usize>;

    /// Applies every resolution or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`MappingLedgerError::MappingNotFound`] for the first
    /// resolution that targets no discovered record; nothing is written.
    async fn apply_resolutions(
        &self,
        migration_id: MigrationId,
        resolutions: &[Resolution],
        resolved_at: DateTime<Utc>,
    ) -> MappingLedgerResult<()>;

    /// Returns every record of a migration ordered by kind, then discovery.
    async fn list_for_migration(
        &self,
        migration_id: MigrationId,
    ) -> MappingLedgerResult<Vec<MappingRecord>>;

    /// Returns the number of records still pending for a migration.
    async fn count_pending(&self, migration_id: MigrationId) -> MappingLedgerResult<usize>;
}

/// Errors returned by mapping ledger implementations.
#[derive(Debug, Clone, Error)]
pub enum MappingLedgerError {
    /// A resolution targets a value that was never discovered.
    #[error("no {kind} mapping for '{source_value}' in migration {migration_id}")]
    MappingNotFound {
        /// Migration the resolution was submitted for.
        migration_id: MigrationId,
        /// Targeted attribute class.
        kind: MappingKind,
        /// Targeted source value.
        source_value: String,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MappingLedgerError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

/// Append-only record of per-task transfer results.
#[async_trait]
pub trait TaskOutcomeLedger: Send + Sync {
    /// Appends one outcome entry.
    async fn append(&self, record: &TaskOutcomeRecord) -> TaskOutcomeLedgerResult<()>;

    /// Returns every entry of a migration in recording order.
    async fn list_for_migration(
        &self,
        migration_id: MigrationId,
    ) -> TaskOutcomeLedgerResult<Vec<TaskOutcomeRecord>>;
}

/// Errors returned by task outcome ledger implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskOutcomeLedgerError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskOutcomeLedgerError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
