//! Migration aggregate root and lifecycle status.

use super::{BackendName, MigrationDomainError, MigrationId, ParseMigrationStatusError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStatus {
    /// Discovered mapping records still await operator resolution.
    PendingConfiguration,
    /// Every mapping record is resolved; the migration may be started.
    ReadyToStart,
    /// An execution pass is in flight.
    Running,
    /// Every task was created on the destination.
    Completed,
    /// The pass finished but at least one task failed.
    CompletedWithErrors,
    /// The pass aborted before any task could be attempted.
    Failed,
}

impl MigrationStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingConfiguration => "pending_configuration",
            Self::ReadyToStart => "ready_to_start",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::CompletedWithErrors => "completed_with_errors",
            Self::Failed => "failed",
        }
    }

    /// Returns whether the status ends the migration lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::CompletedWithErrors | Self::Failed
        )
    }

    /// Returns whether mapping resolutions may still be saved.
    #[must_use]
    pub const fn is_configurable(self) -> bool {
        matches!(self, Self::PendingConfiguration | Self::ReadyToStart)
    }

    /// Returns whether transition to `target` is allowed.
    ///
    /// Terminal states have no outgoing transitions.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::PendingConfiguration,
                Self::PendingConfiguration | Self::ReadyToStart
            ) | (
                Self::ReadyToStart,
                Self::PendingConfiguration | Self::ReadyToStart | Self::Running
            ) | (
                Self::Running,
                Self::Completed | Self::CompletedWithErrors | Self::Failed
            )
        )
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MigrationStatus {
    type Error = ParseMigrationStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending_configuration" => Ok(Self::PendingConfiguration),
            "ready_to_start" => Ok(Self::ReadyToStart),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "completed_with_errors" => Ok(Self::CompletedWithErrors),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseMigrationStatusError(value.to_owned())),
        }
    }
}

/// The (source, destination, containers) tuple a migration moves tasks along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRoute {
    source: BackendName,
    destination: BackendName,
    source_project_id: String,
    destination_list_id: String,
    destination_workspace_id: String,
}

impl MigrationRoute {
    /// Creates a validated migration route.
    ///
    /// The destination workspace is kept verbatim; scope validation happens
    /// where members are listed.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::EmptySourceProject`] or
    /// [`MigrationDomainError::EmptyDestinationList`] when a container
    /// identifier is blank.
    pub fn new(
        source: BackendName,
        destination: BackendName,
        source_project_id: impl Into<String>,
        destination_list_id: impl Into<String>,
        destination_workspace_id: impl Into<String>,
    ) -> Result<Self, MigrationDomainError> {
        let source_project = source_project_id.into().trim().to_owned();
        if source_project.is_empty() {
            return Err(MigrationDomainError::EmptySourceProject);
        }
        let destination_list = destination_list_id.into().trim().to_owned();
        if destination_list.is_empty() {
            return Err(MigrationDomainError::EmptyDestinationList);
        }

        Ok(Self {
            source,
            destination,
            source_project_id: source_project,
            destination_list_id: destination_list,
            destination_workspace_id: destination_workspace_id.into().trim().to_owned(),
        })
    }

    /// Returns the source backend name.
    #[must_use]
    pub const fn source(&self) -> &BackendName {
        &self.source
    }

    /// Returns the destination backend name.
    #[must_use]
    pub const fn destination(&self) -> &BackendName {
        &self.destination
    }

    /// Returns the source container identifier.
    #[must_use]
    pub fn source_project_id(&self) -> &str {
        &self.source_project_id
    }

    /// Returns the destination container identifier.
    #[must_use]
    pub fn destination_list_id(&self) -> &str {
        &self.destination_list_id
    }

    /// Returns the destination workspace identifier, possibly empty.
    #[must_use]
    pub fn destination_workspace_id(&self) -> &str {
        &self.destination_workspace_id
    }
}

/// Running totals for an execution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MigrationProgress {
    /// Number of tasks fetched from the source for the pass.
    pub total: u32,
    /// Number of tasks created on the destination.
    pub completed: u32,
    /// Number of tasks whose creation failed.
    pub failed: u32,
}

impl MigrationProgress {
    /// Returns the number of tasks attempted so far.
    #[must_use]
    pub const fn processed(self) -> u32 {
        self.completed.saturating_add(self.failed)
    }
}

/// Migration aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    id: MigrationId,
    route: MigrationRoute,
    status: MigrationStatus,
    progress: MigrationProgress,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted migration aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMigrationData {
    /// Persisted migration identifier.
    pub id: MigrationId,
    /// Persisted route.
    pub route: MigrationRoute,
    /// Persisted lifecycle status.
    pub status: MigrationStatus,
    /// Persisted progress counters.
    pub progress: MigrationProgress,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Persisted completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Migration {
    /// Creates a migration awaiting mapping configuration.
    #[must_use]
    pub fn new(route: MigrationRoute, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: MigrationId::new(),
            route,
            status: MigrationStatus::PendingConfiguration,
            progress: MigrationProgress::default(),
            created_at: timestamp,
            updated_at: timestamp,
            completed_at: None,
        }
    }

    /// Reconstructs a migration from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMigrationData) -> Self {
        Self {
            id: data.id,
            route: data.route,
            status: data.status,
            progress: data.progress,
            created_at: data.created_at,
            updated_at: data.updated_at,
            completed_at: data.completed_at,
        }
    }

    /// Returns the migration identifier.
    #[must_use]
    pub const fn id(&self) -> MigrationId {
        self.id
    }

    /// Returns the migration route.
    #[must_use]
    pub const fn route(&self) -> &MigrationRoute {
        &self.route
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> MigrationStatus {
        self.status
    }

    /// Returns the progress counters.
    #[must_use]
    pub const fn progress(&self) -> MigrationProgress {
        self.progress
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the completion timestamp, set only in terminal states.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Moves the migration to `target`.
    ///
    /// Entering a terminal state stamps `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::InvalidStatusTransition`] when the
    /// state machine forbids the transition.
    pub fn transition_to(
        &mut self,
        target: MigrationStatus,
        clock: &impl Clock,
    ) -> Result<(), MigrationDomainError> {
        if !self.status.can_transition_to(target) {
            return Err(MigrationDomainError::InvalidStatusTransition {
                migration_id: self.id,
                from: self.status,
                to: target,
            });
        }

        self.status = target;
        self.touch(clock);
        if target.is_terminal() {
            self.completed_at = Some(self.updated_at);
        }
        Ok(())
    }

    /// Starts accounting for a pass over `total` tasks.
    pub fn begin_pass(&mut self, total: u32, clock: &impl Clock) {
        self.progress = MigrationProgress {
            total,
            completed: 0,
            failed: 0,
        };
        self.touch(clock);
    }

    /// Counts one task created on the destination.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::ProgressOverflow`] when every task of
    /// the pass is already accounted for.
    pub fn record_success(&mut self, clock: &impl Clock) -> Result<(), MigrationDomainError> {
        self.ensure_capacity()?;
        self.progress.completed += 1;
        self.touch(clock);
        Ok(())
    }

    /// Counts one task whose creation failed.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::ProgressOverflow`] when every task of
    /// the pass is already accounted for.
    pub fn record_failure(&mut self, clock: &impl Clock) -> Result<(), MigrationDomainError> {
        self.ensure_capacity()?;
        self.progress.failed += 1;
        self.touch(clock);
        Ok(())
    }

    /// Finalizes a finished pass as `completed` or `completed_with_errors`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::InvalidStatusTransition`] unless the
    /// migration is running.
    pub fn finish(&mut self, clock: &impl Clock) -> Result<(), MigrationDomainError> {
        let target = if self.progress.failed == 0 {
            MigrationStatus::Completed
        } else {
            MigrationStatus::CompletedWithErrors
        };
        self.transition_to(target, clock)
    }

    /// Marks an aborted pass as `failed`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::InvalidStatusTransition`] unless the
    /// migration is running.
    pub fn fail(&mut self, clock: &impl Clock) -> Result<(), MigrationDomainError> {
        self.transition_to(MigrationStatus::Failed, clock)
    }

    const fn ensure_capacity(&self) -> Result<(), MigrationDomainError> {
        if self.progress.processed() >= self.progress.total {
            return Err(MigrationDomainError::ProgressOverflow {
                migration_id: self.id,
                total: self.progress.total,
            });
        }
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
