//! Diesel row models for migration persistence.

use super::schema::{migration_mappings, migrations, task_outcomes};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for migration aggregates.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = migrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MigrationRow {
    /// Migration identifier.
    pub id: uuid::Uuid,
    /// Source backend name.
    pub source_backend: String,
    /// Destination backend name.
    pub destination_backend: String,
    /// Source container identifier.
    pub source_project_id: String,
    /// Destination container identifier.
    pub destination_list_id: String,
    /// Destination workspace identifier.
    pub destination_workspace_id: String,
    /// Lifecycle status.
    pub status: String,
    /// Tasks fetched for the latest pass.
    pub total_tasks: i32,
    /// Tasks created during the latest pass.
    pub completed_tasks: i32,
    /// Tasks that failed during the latest pass.
    pub failed_tasks: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Terminal status timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Insert model for migration aggregates.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = migrations)]
pub struct NewMigrationRow {
    /// Migration identifier.
    pub id: uuid::Uuid,
    /// Source backend name.
    pub source_backend: String,
    /// Destination backend name.
    pub destination_backend: String,
    /// Source container identifier.
    pub source_project_id: String,
    /// Destination container identifier.
    pub destination_list_id: String,
    /// Destination workspace identifier.
    pub destination_workspace_id: String,
    /// Lifecycle status.
    pub status: String,
    /// Tasks fetched for the latest pass.
    pub total_tasks: i32,
    /// Tasks created during the latest pass.
    pub completed_tasks: i32,
    /// Tasks that failed during the latest pass.
    pub failed_tasks: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Terminal status timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Changeset for the mutable migration columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = migrations)]
#[diesel(treat_none_as_null = true)]
pub struct MigrationChangeset {
    /// Lifecycle status.
    pub status: String,
    /// Tasks fetched for the latest pass.
    pub total_tasks: i32,
    /// Tasks created during the latest pass.
    pub completed_tasks: i32,
    /// Tasks that failed during the latest pass.
    pub failed_tasks: i32,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Terminal status timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Query result row for mapping records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = migration_mappings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MappingRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Owning migration.
    pub migration_id: uuid::Uuid,
    /// Attribute class.
    pub kind: String,
    /// Discovered source value.
    pub source_value: String,
    /// Resolved destination value.
    pub destination_value: Option<String>,
    /// Resolution state.
    pub status: String,
    /// Assignee display details.
    pub metadata: Option<Value>,
    /// Discovery timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest resolution timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for mapping records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = migration_mappings)]
pub struct NewMappingRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Owning migration.
    pub migration_id: uuid::Uuid,
    /// Attribute class.
    pub kind: String,
    /// Discovered source value.
    pub source_value: String,
    /// Resolved destination value.
    pub destination_value: Option<String>,
    /// Resolution state.
    pub status: String,
    /// Assignee display details.
    pub metadata: Option<Value>,
    /// Discovery timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest resolution timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for task outcome entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_outcomes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutcomeRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Owning migration.
    pub migration_id: uuid::Uuid,
    /// Source task identifier.
    pub source_task_id: String,
    /// Destination task identifier on success.
    pub destination_task_id: Option<String>,
    /// Transfer result.
    pub outcome: String,
    /// Failure detail.
    pub error: Option<String>,
    /// Recording timestamp.
    pub recorded_at: DateTime<Utc>,
}

/// Insert model for task outcome entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_outcomes)]
pub struct NewOutcomeRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Owning migration.
    pub migration_id: uuid::Uuid,
    /// Source task identifier.
    pub source_task_id: String,
    /// Destination task identifier on success.
    pub destination_task_id: Option<String>,
    /// Transfer result.
    pub outcome: String,
    /// Failure detail.
    pub error: Option<String>,
    /// Recording timestamp.
    pub recorded_at: DateTime<Utc>,
}
