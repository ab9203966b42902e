//! Service layer orchestrating the migration lifecycle.

use super::{
    discovery::MappingDiscovery,
    error::{MigrationServiceError, MigrationServiceResult},
    execution::ExecutionEngine,
    registry::ProviderRegistry,
    tracker::ExecutionTracker,
    view::{MappingViewBuilder, MappingsState},
};
use crate::migration::{
    domain::{
        BackendName, Migration, MigrationId, MigrationRoute, MigrationStatus, Resolution,
        TaskOutcomeRecord,
    },
    ports::{
        IntegrationProvider, MappingLedger, MigrationRepository, MigrationRepositoryError,
        TaskOutcomeLedger,
    },
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for creating a migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMigrationRequest {
    /// Source backend name.
    pub source: String,
    /// Destination backend name.
    pub destination: String,
    /// Source container identifier.
    pub source_project_id: String,
    /// Destination container identifier.
    pub destination_list_id: String,
    /// Destination workspace identifier.
    pub destination_workspace_id: String,
}

impl CreateMigrationRequest {
    /// Creates a request without a destination workspace.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        source_project_id: impl Into<String>,
        destination_list_id: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            source_project_id: source_project_id.into(),
            destination_list_id: destination_list_id.into(),
            destination_workspace_id: String::new(),
        }
    }

    /// Sets the destination workspace identifier.
    #[must_use]
    pub fn with_destination_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.destination_workspace_id = workspace_id.into();
        self
    }
}

/// Migration lifecycle orchestration service.
pub struct MigrationService<R, L, O, C>
where
    R: MigrationRepository + 'static,
    L: MappingLedger + 'static,
    O: TaskOutcomeLedger + 'static,
    C: Clock + Send + Sync + 'static,
{
    repository: Arc<R>,
    ledger: Arc<L>,
    outcomes: Arc<O>,
    clock: Arc<C>,
    providers: ProviderRegistry,
    discovery: MappingDiscovery<L, C>,
    view: MappingViewBuilder<L>,
    engine: ExecutionEngine<R, L, O, C>,
    executions: ExecutionTracker,
}

impl<R, L, O, C> Clone for MigrationService<R, L, O, C>
where
    R: MigrationRepository + 'static,
    L: MappingLedger + 'static,
    O: TaskOutcomeLedger + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            ledger: Arc::clone(&self.ledger),
            outcomes: Arc::clone(&self.outcomes),
            clock: Arc::clone(&self.clock),
            providers: self.providers.clone(),
            discovery: self.discovery.clone(),
            view: self.view.clone(),
            engine: self.engine.clone(),
            executions: self.executions.clone(),
        }
    }
}

impl<R, L, O, C> MigrationService<R, L, O, C>
where
    R: MigrationRepository + 'static,
    L: MappingLedger + 'static,
    O: TaskOutcomeLedger + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new migration service.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        ledger: Arc<L>,
        outcomes: Arc<O>,
        providers: ProviderRegistry,
        clock: Arc<C>,
    ) -> Self {
        Self {
            discovery: MappingDiscovery::new(Arc::clone(&ledger), Arc::clone(&clock)),
            view: MappingViewBuilder::new(Arc::clone(&ledger)),
            engine: ExecutionEngine::new(
                Arc::clone(&repository),
                Arc::clone(&ledger),
                Arc::clone(&outcomes),
                Arc::clone(&clock),
            ),
            executions: ExecutionTracker::new(),
            repository,
            ledger,
            outcomes,
            clock,
            providers,
        }
    }

    fn provider(&self, name: &BackendName) -> MigrationServiceResult<Arc<dyn IntegrationProvider>> {
        self.providers
            .get(name)
            .ok_or_else(|| MigrationServiceError::UnknownBackend(name.clone()))
    }

    async fn find_or_error(&self, migration_id: MigrationId) -> MigrationServiceResult<Migration> {
        self.repository
            .find_by_id(migration_id)
            .await?
            .ok_or(MigrationServiceError::NotFound(migration_id))
    }

    async fn find_configurable(
        &self,
        migration_id: MigrationId,
    ) -> MigrationServiceResult<Migration> {
        let migration = self.find_or_error(migration_id).await?;
        if !migration.status().is_configurable() {
            return Err(MigrationServiceError::NotConfigurable {
                migration_id,
                status: migration.status(),
            });
        }
        Ok(migration)
    }

    /// Creates a migration and discovers its mappings.
    ///
    /// Backends, containers, and the destination workspace are validated and
    /// the source is read before anything is persisted.
    ///
    /// # Errors
    ///
    /// Returns domain validation errors,
    /// [`MigrationServiceError::UnknownBackend`],
    /// [`MigrationServiceError::MissingDestinationScope`],
    /// [`MigrationServiceError::SourceUnavailable`], or persistence errors.
    pub async fn create(
        &self,
        request: CreateMigrationRequest,
    ) -> MigrationServiceResult<Migration> {
        let source_name = BackendName::new(request.source)?;
        let destination_name = BackendName::new(request.destination)?;
        let source = self.provider(&source_name)?;
        self.provider(&destination_name)?;
        if request.destination_workspace_id.trim().is_empty() {
            return Err(MigrationServiceError::MissingDestinationScope);
        }
        let route = MigrationRoute::new(
            source_name,
            destination_name,
            request.source_project_id,
            request.destination_list_id,
            request.destination_workspace_id,
        )?;

        let tasks = self
            .discovery
            .fetch(&*source, route.source_project_id())
            .await?;
        let migration = Migration::new(route, &*self.clock);
        self.repository.store(&migration).await?;
        let inserted = self.discovery.seed(migration.id(), &tasks).await?;

        tracing::info!(
            migration_id = %migration.id(),
            source = %migration.route().source(),
            destination = %migration.route().destination(),
            tasks = tasks.len(),
            mappings = inserted,
            "migration created"
        );
        Ok(migration)
    }

    /// Re-runs discovery against the current source task set.
    ///
    /// Returns the number of newly discovered values. The migration status is
    /// not changed.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationServiceError::NotFound`],
    /// [`MigrationServiceError::NotConfigurable`] once the migration has
    /// started, [`MigrationServiceError::SourceUnavailable`], or persistence
    /// errors.
    pub async fn sync(&self, migration_id: MigrationId) -> MigrationServiceResult<usize> {
        let migration = self.find_configurable(migration_id).await?;
        let source = self.provider(migration.route().source())?;
        let discovered = self
            .discovery
            .discover(migration_id, &*source, migration.route().source_project_id())
            .await?;
        tracing::info!(
            migration_id = %migration_id,
            tasks = discovered.tasks.len(),
            mappings = discovered.inserted,
            "mappings synchronized"
        );
        Ok(discovered.inserted)
    }

    /// Builds the mapping resolution view for a migration.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationServiceError::NotFound`],
    /// [`MigrationServiceError::MissingDestinationScope`],
    /// [`MigrationServiceError::DestinationUnavailable`], or persistence
    /// errors.
    pub async fn mappings(&self, migration_id: MigrationId) -> MigrationServiceResult<MappingsState> {
        let migration = self.find_or_error(migration_id).await?;
        let destination = self.provider(migration.route().destination())?;
        self.view.build(&migration, &*destination).await
    }

    /// Applies operator resolutions and recomputes readiness.
    ///
    /// The migration moves to `ready_to_start` when no record is left
    /// pending, and to `pending_configuration` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationServiceError::NotFound`],
    /// [`MigrationServiceError::NotConfigurable`],
    /// [`MigrationServiceError::MappingNotFound`] (nothing is applied), or
    /// persistence errors.
    pub async fn save(
        &self,
        migration_id: MigrationId,
        resolutions: &[Resolution],
    ) -> MigrationServiceResult<Migration> {
        let mut migration = self.find_configurable(migration_id).await?;
        self.ledger
            .apply_resolutions(migration_id, resolutions, self.clock.utc())
            .await?;

        let pending = self.ledger.count_pending(migration_id).await?;
        let target = if pending == 0 {
            MigrationStatus::ReadyToStart
        } else {
            MigrationStatus::PendingConfiguration
        };
        let previous = migration.status();
        migration.transition_to(target, &*self.clock)?;
        self.repository.update_guarded(&migration, previous).await?;

        tracing::info!(
            migration_id = %migration_id,
            resolved = resolutions.len(),
            pending,
            status = %migration.status(),
            "mappings saved"
        );
        Ok(migration)
    }

    /// Flips a fully mapped migration to `running` and launches its
    /// execution in the background.
    ///
    /// Returns as soon as the execution is launched.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationServiceError::NotFound`],
    /// [`MigrationServiceError::MappingsIncomplete`] while records are
    /// pending, [`MigrationServiceError::AlreadyRunning`] when an execution
    /// is in flight, [`MigrationServiceError::NotConfigurable`] for terminal
    /// migrations, or persistence errors.
    pub async fn start(&self, migration_id: MigrationId) -> MigrationServiceResult<Migration> {
        let mut migration = self.find_or_error(migration_id).await?;
        match migration.status() {
            MigrationStatus::Running => {
                return Err(MigrationServiceError::AlreadyRunning(migration_id));
            }
            status if status.is_terminal() => {
                return Err(MigrationServiceError::NotConfigurable {
                    migration_id,
                    status,
                });
            }
            _ => {}
        }
        if self.executions.is_running(migration_id) {
            return Err(MigrationServiceError::AlreadyRunning(migration_id));
        }

        let pending = self.ledger.count_pending(migration_id).await?;
        if pending > 0 {
            return Err(MigrationServiceError::MappingsIncomplete {
                migration_id,
                pending,
            });
        }

        let source = self.provider(migration.route().source())?;
        let destination = self.provider(migration.route().destination())?;

        if migration.status() == MigrationStatus::PendingConfiguration {
            migration.transition_to(MigrationStatus::ReadyToStart, &*self.clock)?;
            self.claim(&migration, MigrationStatus::PendingConfiguration)
                .await?;
        }
        migration.transition_to(MigrationStatus::Running, &*self.clock)?;
        self.claim(&migration, MigrationStatus::ReadyToStart).await?;

        let engine = self.engine.clone();
        let pass = migration.clone();
        let handle = tokio::spawn(async move {
            if let Err(err) = engine.execute(pass, &*source, &*destination).await {
                tracing::error!(
                    migration_id = %migration_id,
                    error = %err,
                    "execution could not record its failure"
                );
            }
        });
        if !self.executions.register(migration_id, handle) {
            tracing::warn!(migration_id = %migration_id, "execution handle already registered");
        }

        tracing::info!(migration_id = %migration_id, "migration started");
        Ok(migration)
    }

    /// Persists a status flip only if no other writer changed the status
    /// first.
    ///
    /// Losing the compare-and-set means a concurrent Start got there first,
    /// whichever step of the promotion it was on.
    async fn claim(
        &self,
        migration: &Migration,
        expected: MigrationStatus,
    ) -> MigrationServiceResult<()> {
        match self.repository.update_guarded(migration, expected).await {
            Err(MigrationRepositoryError::StatusConflict { actual, .. }) => {
                tracing::debug!(
                    migration_id = %migration.id(),
                    expected = %expected,
                    actual = %actual,
                    "start lost the status claim"
                );
                Err(MigrationServiceError::AlreadyRunning(migration.id()))
            }
            other => Ok(other?),
        }
    }

    /// Cancels an in-flight execution and marks the migration `failed`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationServiceError::NotFound`], a domain transition error
    /// when the migration is not running, or persistence errors.
    pub async fn cancel(&self, migration_id: MigrationId) -> MigrationServiceResult<Migration> {
        let current = self.find_or_error(migration_id).await?;
        if current.status() == MigrationStatus::Running {
            self.executions.abort(migration_id).await;
        }

        let mut migration = self.find_or_error(migration_id).await?;
        migration.fail(&*self.clock)?;
        self.repository
            .update_guarded(&migration, MigrationStatus::Running)
            .await?;
        tracing::info!(migration_id = %migration_id, "migration cancelled");
        Ok(migration)
    }

    /// Waits for the background execution of a migration, then returns the
    /// migration as persisted.
    ///
    /// Returns immediately when no execution is tracked.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationServiceError::ExecutionPanicked`] when the
    /// execution task panicked, [`MigrationServiceError::NotFound`], or
    /// persistence errors.
    pub async fn wait_for_execution(
        &self,
        migration_id: MigrationId,
    ) -> MigrationServiceResult<Migration> {
        self.executions
            .join(migration_id)
            .await
            .map_err(|source| MigrationServiceError::ExecutionPanicked {
                migration_id,
                source,
            })?;
        self.find_or_error(migration_id).await
    }

    /// Returns one migration.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationServiceError::NotFound`] or persistence errors.
    pub async fn get(&self, migration_id: MigrationId) -> MigrationServiceResult<Migration> {
        self.find_or_error(migration_id).await
    }

    /// Lists all migrations, newest first.
    ///
    /// # Errors
    ///
    /// Returns persistence errors.
    pub async fn list(&self) -> MigrationServiceResult<Vec<Migration>> {
        Ok(self.repository.list_all().await?)
    }

    /// Lists the recorded task outcomes of a migration in recording order.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationServiceError::NotFound`] or persistence errors.
    pub async fn outcomes(
        &self,
        migration_id: MigrationId,
    ) -> MigrationServiceResult<Vec<TaskOutcomeRecord>> {
        self.find_or_error(migration_id).await?;
        Ok(self.outcomes.list_for_migration(migration_id).await?)
    }
}
