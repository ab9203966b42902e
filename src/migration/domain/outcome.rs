//! Append-only task outcome ledger entries.

use super::{MigrationId, OutcomeId, ParseTaskOutcomeError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one task transfer attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    /// The task was created on the destination.
    Success,
    /// The destination rejected the task.
    Failed,
}

impl TaskOutcome {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskOutcome {
    type Error = ParseTaskOutcomeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseTaskOutcomeError(value.to_owned())),
        }
    }
}

/// Ledger entry recording one source task's transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcomeRecord {
    id: OutcomeId,
    migration_id: MigrationId,
    source_task_id: String,
    destination_task_id: Option<String>,
    outcome: TaskOutcome,
    error: Option<String>,
    recorded_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted outcome entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedOutcomeData {
    /// Persisted entry identifier.
    pub id: OutcomeId,
    /// Owning migration.
    pub migration_id: MigrationId,
    /// Source task identifier.
    pub source_task_id: String,
    /// Destination task identifier on success.
    pub destination_task_id: Option<String>,
    /// Transfer result.
    pub outcome: TaskOutcome,
    /// Failure detail.
    pub error: Option<String>,
    /// Recording timestamp.
    pub recorded_at: DateTime<Utc>,
}

impl TaskOutcomeRecord {
    /// Records a task created on the destination.
    #[must_use]
    pub fn success(
        migration_id: MigrationId,
        source_task_id: impl Into<String>,
        destination_task_id: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: OutcomeId::new(),
            migration_id,
            source_task_id: source_task_id.into(),
            destination_task_id: Some(destination_task_id.into()),
            outcome: TaskOutcome::Success,
            error: None,
            recorded_at: clock.utc(),
        }
    }

    /// Records a task the destination rejected.
    #[must_use]
    pub fn failure(
        migration_id: MigrationId,
        source_task_id: impl Into<String>,
        error: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: OutcomeId::new(),
            migration_id,
            source_task_id: source_task_id.into(),
            destination_task_id: None,
            outcome: TaskOutcome::Failed,
            error: Some(error.into()),
            recorded_at: clock.utc(),
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedOutcomeData) -> Self {
        Self {
            id: data.id,
            migration_id: data.migration_id,
            source_task_id: data.source_task_id,
            destination_task_id: data.destination_task_id,
            outcome: data.outcome,
            error: data.error,
            recorded_at: data.recorded_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> OutcomeId {
        self.id
    }

    /// Returns the owning migration.
    #[must_use]
    pub const fn migration_id(&self) -> MigrationId {
        self.migration_id
    }

    /// Returns the source task identifier.
    #[must_use]
    pub fn source_task_id(&self) -> &str {
        &self.source_task_id
    }

    /// Returns the destination task identifier, set only on success.
    #[must_use]
    pub fn destination_task_id(&self) -> Option<&str> {
        self.destination_task_id.as_deref()
    }

    /// Returns the transfer result.
    #[must_use]
    pub const fn outcome(&self) -> TaskOutcome {
        self.outcome
    }

    /// Returns the failure detail, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the recording timestamp.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
