//! Error types for migration domain validation and parsing.

use super::{MigrationId, MigrationStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating migration domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MigrationDomainError {
    /// The backend name is empty after trimming.
    #[error("backend name must not be empty")]
    EmptyBackendName,

    /// The backend name contains characters outside `[a-z0-9_]`.
    #[error(
        "backend name '{0}' contains invalid characters (only lowercase alphanumeric and underscores allowed)"
    )]
    InvalidBackendName(String),

    /// The backend name exceeds the 100-character storage limit.
    #[error("backend name exceeds 100 character limit: {0}")]
    BackendNameTooLong(String),

    /// The source project identifier is empty after trimming.
    #[error("source project id must not be empty")]
    EmptySourceProject,

    /// The destination list identifier is empty after trimming.
    #[error("destination list id must not be empty")]
    EmptyDestinationList,

    /// A lifecycle transition not permitted by the state machine.
    #[error("invalid status transition for migration {migration_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Migration being transitioned.
        migration_id: MigrationId,
        /// Current lifecycle status.
        from: MigrationStatus,
        /// Requested lifecycle status.
        to: MigrationStatus,
    },

    /// Recording another task result would exceed the task total.
    #[error("migration {migration_id} already accounted for all {total} tasks")]
    ProgressOverflow {
        /// Migration whose counters would overflow.
        migration_id: MigrationId,
        /// Total number of tasks in the execution pass.
        total: u32,
    },

    /// A mapping resolution carried an empty destination value.
    #[error("destination value for {kind} mapping '{source_value}' must not be empty")]
    EmptyResolution {
        /// Mapping kind in canonical string form.
        kind: String,
        /// Source value being resolved.
        source_value: String,
    },
}

/// Error returned while parsing migration status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown migration status: {0}")]
pub struct ParseMigrationStatusError(pub String);

/// Error returned while parsing mapping kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown mapping kind: {0}")]
pub struct ParseMappingKindError(pub String);

/// Error returned while parsing mapping resolution status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown mapping status: {0}")]
pub struct ParseMappingStatusError(pub String);

/// Error returned while parsing task outcomes from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task outcome: {0}")]
pub struct ParseTaskOutcomeError(pub String);
