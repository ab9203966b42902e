//! Execution engine replaying source tasks against the destination.

use super::error::{MigrationServiceError, MigrationServiceResult};
use crate::migration::{
    domain::{
        DEFAULT_DESTINATION_STATUS, MappingKind, MappingRecord, Migration, MigrationId,
        MigrationProgress, MigrationStatus, PriorityVocabulary, SourceTask, TaskAssignee,
        TaskOutcomeRecord,
    },
    ports::{
        IntegrationProvider, MappingLedger, MigrationRepository, MigrationRepositoryError,
        TaskOutcomeLedger,
    },
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;

/// Summary of one execution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Migration the pass ran for.
    pub migration_id: MigrationId,
    /// Terminal status the migration reached.
    pub status: MigrationStatus,
    /// Final pass counters.
    pub progress: MigrationProgress,
    /// Reason the pass was aborted, if it was.
    pub abort_reason: Option<String>,
}

/// Resolved destination values keyed by source value, one table per kind.
#[derive(Debug, Default)]
pub(crate) struct Translation {
    statuses: HashMap<String, String>,
    priorities: HashMap<String, String>,
    assignees: HashMap<String, String>,
    vocabulary: Option<PriorityVocabulary>,
}

impl Translation {
    /// Builds lookup tables from ledger records; unresolved records are
    /// ignored.
    pub(crate) fn from_records(
        records: Vec<MappingRecord>,
        vocabulary: Option<PriorityVocabulary>,
    ) -> Self {
        let mut translation = Self {
            vocabulary,
            ..Self::default()
        };
        for record in records {
            let Some(destination) = record.destination_value() else {
                continue;
            };
            let table = match record.kind() {
                MappingKind::Status => &mut translation.statuses,
                MappingKind::Priority => &mut translation.priorities,
                MappingKind::Assignee => &mut translation.assignees,
            };
            table.insert(record.source_value().to_owned(), destination.to_owned());
        }
        translation
    }

    /// Rewrites a source task into the shape sent to the destination.
    pub(crate) fn apply(&self, task: &SourceTask) -> SourceTask {
        let status = self
            .statuses
            .get(&task.status)
            .cloned()
            .unwrap_or_else(|| DEFAULT_DESTINATION_STATUS.to_owned());

        let mapped_priority = self.priorities.get(&task.priority).cloned().unwrap_or_default();
        let priority = match &self.vocabulary {
            Some(vocabulary) if !mapped_priority.is_empty() => {
                vocabulary.option_ref(&mapped_priority).unwrap_or_default()
            }
            _ => mapped_priority,
        };

        let assignees = task
            .assignees
            .iter()
            .filter_map(|assignee| {
                let Some(destination_id) = self.assignees.get(&assignee.id) else {
                    tracing::debug!(
                        task_id = %task.id,
                        assignee_id = %assignee.id,
                        "dropping unmapped assignee"
                    );
                    return None;
                };
                Some(TaskAssignee {
                    id: destination_id.clone(),
                    name: assignee.name.clone(),
                    email: assignee.email.clone(),
                })
            })
            .collect();

        SourceTask {
            status,
            priority,
            assignees,
            ..task.clone()
        }
    }
}

/// Runs execution passes for migrations already flipped to `running`.
pub struct ExecutionEngine<R, L, O, C>
where
    R: MigrationRepository,
    L: MappingLedger,
    O: TaskOutcomeLedger,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    ledger: Arc<L>,
    outcomes: Arc<O>,
    clock: Arc<C>,
}

impl<R, L, O, C> Clone for ExecutionEngine<R, L, O, C>
where
    R: MigrationRepository,
    L: MappingLedger,
    O: TaskOutcomeLedger,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            ledger: Arc::clone(&self.ledger),
            outcomes: Arc::clone(&self.outcomes),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, L, O, C> ExecutionEngine<R, L, O, C>
where
    R: MigrationRepository,
    L: MappingLedger,
    O: TaskOutcomeLedger,
    C: Clock + Send + Sync,
{
    /// Creates an execution engine.
    #[must_use]
    pub const fn new(repository: Arc<R>, ledger: Arc<L>, outcomes: Arc<O>, clock: Arc<C>) -> Self {
        Self {
            repository,
            ledger,
            outcomes,
            clock,
        }
    }

    /// Runs one execution pass and finalizes the migration.
    ///
    /// Per-task creation failures are recorded and never stop the pass. A
    /// failed task fetch, priority vocabulary lookup, or persistence write
    /// aborts the pass and marks the migration `failed`.
    ///
    /// Progress writes are guarded on the `running` status, so a migration
    /// cancelled concurrently is never written back to `running`. The
    /// returned report always carries the status that was last persisted.
    ///
    /// # Errors
    ///
    /// Returns repository errors only when the `failed` status itself cannot
    /// be persisted after an abort. A pass whose migration left `running`
    /// under it (for example through cancellation) stops without writing.
    pub async fn execute(
        &self,
        mut migration: Migration,
        source: &dyn IntegrationProvider,
        destination: &dyn IntegrationProvider,
    ) -> MigrationServiceResult<ExecutionReport> {
        let migration_id = migration.id();
        tracing::info!(
            migration_id = %migration_id,
            source = %migration.route().source(),
            destination = %migration.route().destination(),
            "execution started"
        );

        match self.run_pass(&mut migration, source, destination).await {
            Ok(()) => {
                tracing::info!(
                    migration_id = %migration_id,
                    status = %migration.status(),
                    completed = migration.progress().completed,
                    failed = migration.progress().failed,
                    "execution finished"
                );
                Ok(report(&migration, None))
            }
            Err(err) => {
                tracing::error!(migration_id = %migration_id, error = %err, "execution aborted");
                let settled = self.settle_abort(migration, &err).await?;
                Ok(report(&settled, Some(err.to_string())))
            }
        }
    }

    /// Persists `failed` for an aborted pass and returns the stored state.
    ///
    /// When another writer already moved the migration out of `running`,
    /// nothing is written and the stored migration is reported instead.
    async fn settle_abort(
        &self,
        migration: Migration,
        err: &MigrationServiceError,
    ) -> MigrationServiceResult<Migration> {
        let superseded = matches!(
            err,
            MigrationServiceError::Repository(MigrationRepositoryError::StatusConflict { .. })
        );
        if superseded || migration.status() != MigrationStatus::Running {
            return self.stored_or(migration).await;
        }

        let mut failed = migration.clone();
        failed.fail(&*self.clock)?;
        match self
            .repository
            .update_guarded(&failed, MigrationStatus::Running)
            .await
        {
            Ok(()) => Ok(failed),
            Err(MigrationRepositoryError::StatusConflict { .. }) => {
                self.stored_or(migration).await
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn stored_or(&self, fallback: Migration) -> MigrationServiceResult<Migration> {
        let stored = self.repository.find_by_id(fallback.id()).await?;
        Ok(stored.unwrap_or(fallback))
    }

    async fn run_pass(
        &self,
        migration: &mut Migration,
        source: &dyn IntegrationProvider,
        destination: &dyn IntegrationProvider,
    ) -> MigrationServiceResult<()> {
        let tasks = source
            .fetch_tasks(migration.route().source_project_id())
            .await
            .map_err(MigrationServiceError::SourceUnavailable)?;

        let total = u32::try_from(tasks.len()).unwrap_or(u32::MAX);
        migration.begin_pass(total, &*self.clock);
        self.persist_progress(migration).await?;

        let records = self.ledger.list_for_migration(migration.id()).await?;
        let vocabulary = destination
            .priority_vocabulary(migration.route().destination_list_id())
            .await
            .map_err(MigrationServiceError::DestinationUnavailable)?;
        let translation = Translation::from_records(records, vocabulary);

        for task in &tasks {
            self.transfer(migration, destination, &translation, task)
                .await?;
        }

        // The in-memory copy only turns terminal once the store has it.
        let mut finished = migration.clone();
        finished.finish(&*self.clock)?;
        self.persist_progress(&finished).await?;
        *migration = finished;
        Ok(())
    }

    async fn transfer(
        &self,
        migration: &mut Migration,
        destination: &dyn IntegrationProvider,
        translation: &Translation,
        task: &SourceTask,
    ) -> MigrationServiceResult<()> {
        let translated = translation.apply(task);
        tracing::debug!(
            migration_id = %migration.id(),
            task_id = %task.id,
            status = %translated.status,
            priority = %translated.priority,
            assignees = translated.assignees.len(),
            "creating destination task"
        );

        let route = migration.route();
        let outcome = match destination
            .create_task(
                route.destination_list_id(),
                route.destination_workspace_id(),
                &translated,
            )
            .await
        {
            Ok(created) => {
                migration.record_success(&*self.clock)?;
                TaskOutcomeRecord::success(migration.id(), &task.id, created.id, &*self.clock)
            }
            Err(err) => {
                tracing::warn!(
                    migration_id = %migration.id(),
                    task_id = %task.id,
                    error = %err,
                    "destination rejected task"
                );
                migration.record_failure(&*self.clock)?;
                TaskOutcomeRecord::failure(migration.id(), &task.id, err.to_string(), &*self.clock)
            }
        };

        self.outcomes.append(&outcome).await?;
        self.persist_progress(migration).await
    }

    async fn persist_progress(&self, migration: &Migration) -> MigrationServiceResult<()> {
        self.repository
            .update_guarded(migration, MigrationStatus::Running)
            .await?;
        Ok(())
    }
}

fn report(migration: &Migration, abort_reason: Option<String>) -> ExecutionReport {
    ExecutionReport {
        migration_id: migration.id(),
        status: migration.status(),
        progress: migration.progress(),
        abort_reason,
    }
}
