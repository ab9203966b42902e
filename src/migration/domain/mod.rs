//! Domain model for task migrations between work-tracking backends.
//!
//! The migration domain models the migration aggregate and its lifecycle,
//! the mapping ledger that translates discovered source values, the task
//! outcome ledger, and the task shapes exchanged with integration providers.
//! Infrastructure concerns remain outside this boundary.

mod error;
mod ids;
mod mapping;
mod migration;
mod outcome;
mod task;

pub use error::{
    MigrationDomainError, ParseMappingKindError, ParseMappingStatusError,
    ParseMigrationStatusError, ParseTaskOutcomeError,
};
pub use ids::{BackendName, MappingId, MigrationId, OutcomeId};
pub use mapping::{
    AssigneeMetadata, MappingKind, MappingRecord, MappingStatus, PersistedMappingData, Resolution,
};
pub use migration::{
    Migration, MigrationProgress, MigrationRoute, MigrationStatus, PersistedMigrationData,
};
pub use outcome::{PersistedOutcomeData, TaskOutcome, TaskOutcomeRecord};
pub use task::{
    CreatedTask, DEFAULT_DESTINATION_STATUS, Member, PriorityVocabulary, SourceTask, TaskAssignee,
    default_priorities,
};
