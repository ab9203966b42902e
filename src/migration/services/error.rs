//! Service-level error taxonomy for migration orchestration.

use crate::migration::{
    domain::{BackendName, MappingKind, MigrationDomainError, MigrationId, MigrationStatus},
    ports::{
        IntegrationError, MappingLedgerError, MigrationRepositoryError, TaskOutcomeLedgerError,
    },
};
use thiserror::Error;

/// Errors returned by migration services.
#[derive(Debug, Error)]
pub enum MigrationServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] MigrationDomainError),

    /// Migration repository operation failed.
    #[error(transparent)]
    Repository(#[from] MigrationRepositoryError),

    /// Mapping ledger operation failed.
    #[error(transparent)]
    Ledger(MappingLedgerError),

    /// Task outcome ledger operation failed.
    #[error(transparent)]
    Outcomes(#[from] TaskOutcomeLedgerError),

    /// The source backend could not return its task list.
    #[error("source backend unavailable: {0}")]
    SourceUnavailable(#[source] IntegrationError),

    /// The destination backend could not serve a read or vocabulary lookup.
    #[error("destination backend unavailable: {0}")]
    DestinationUnavailable(#[source] IntegrationError),

    /// The destination workspace identifier is empty.
    #[error("destination workspace id is required")]
    MissingDestinationScope,

    /// A resolution targets a value that was never discovered.
    #[error("no {kind} mapping discovered for '{source_value}'")]
    MappingNotFound {
        /// Targeted attribute class.
        kind: MappingKind,
        /// Targeted source value.
        source_value: String,
    },

    /// Start was requested while mapping records are still pending.
    #[error("migration {migration_id} still has {pending} unresolved mappings")]
    MappingsIncomplete {
        /// Migration that was asked to start.
        migration_id: MigrationId,
        /// Number of pending records.
        pending: usize,
    },

    /// No integration provider is registered under the backend name.
    #[error("no integration provider registered for backend '{0}'")]
    UnknownBackend(BackendName),

    /// No migration exists with the given identifier.
    #[error("migration {0} not found")]
    NotFound(MigrationId),

    /// An execution is already in flight for the migration.
    #[error("migration {0} is already running")]
    AlreadyRunning(MigrationId),

    /// Mappings can no longer be changed in the current status.
    #[error("migration {migration_id} cannot be configured while {status}")]
    NotConfigurable {
        /// Migration being configured.
        migration_id: MigrationId,
        /// Current lifecycle status.
        status: MigrationStatus,
    },

    /// The background execution task panicked.
    #[error("execution task for migration {migration_id} ended abnormally: {source}")]
    ExecutionPanicked {
        /// Migration whose execution ended.
        migration_id: MigrationId,
        /// Join failure reported by the runtime.
        source: tokio::task::JoinError,
    },
}

impl From<MappingLedgerError> for MigrationServiceError {
    fn from(err: MappingLedgerError) -> Self {
        match err {
            MappingLedgerError::MappingNotFound {
                kind, source_value, ..
            } => Self::MappingNotFound { kind, source_value },
            MappingLedgerError::Persistence(_) => Self::Ledger(err),
        }
    }
}

/// Result type for migration service operations.
pub type MigrationServiceResult<T> = Result<T, MigrationServiceError>;
