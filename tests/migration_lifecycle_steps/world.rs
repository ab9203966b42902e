//! Shared world state for migration lifecycle BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskferry::migration::{
    adapters::memory::{
        InMemoryIntegrationProvider, InMemoryMappingLedger, InMemoryMigrationRepository,
        InMemoryOutcomeLedger,
    },
    domain::{BackendName, Migration},
    services::{MigrationService, MigrationServiceError, ProviderRegistry},
};

/// Source container used by every scenario.
pub const SOURCE_PROJECT: &str = "project-1";
/// Destination container used by every scenario.
pub const DESTINATION_LIST: &str = "list-1";
/// Destination workspace used by every scenario.
pub const DESTINATION_WORKSPACE: &str = "team-1";

/// Service type used by the BDD world.
pub type TestMigrationService = MigrationService<
    InMemoryMigrationRepository,
    InMemoryMappingLedger,
    InMemoryOutcomeLedger,
    DefaultClock,
>;

/// Scenario world for migration lifecycle behaviour tests.
pub struct MigrationWorld {
    pub service: TestMigrationService,
    pub source: InMemoryIntegrationProvider,
    pub destination: InMemoryIntegrationProvider,
    pub migration: Option<Migration>,
    pub last_start_result: Option<Result<Migration, MigrationServiceError>>,
    pub last_create_result: Option<Result<Migration, MigrationServiceError>>,
}

impl MigrationWorld {
    /// Creates a world with `asana` and `clickup` registered as in-memory
    /// backends.
    ///
    /// # Panics
    ///
    /// Panics if the fixed backend names fail validation.
    #[must_use]
    pub fn new() -> Self {
        let source = InMemoryIntegrationProvider::new();
        let destination = InMemoryIntegrationProvider::new();
        let providers = ProviderRegistry::new()
            .with_provider(backend("asana"), Arc::new(source.clone()))
            .with_provider(backend("clickup"), Arc::new(destination.clone()));
        let service = MigrationService::new(
            Arc::new(InMemoryMigrationRepository::new()),
            Arc::new(InMemoryMappingLedger::new()),
            Arc::new(InMemoryOutcomeLedger::new()),
            providers,
            Arc::new(DefaultClock),
        );

        Self {
            service,
            source,
            destination,
            migration: None,
            last_start_result: None,
            last_create_result: None,
        }
    }

    /// Returns the migration created earlier in the scenario.
    ///
    /// # Errors
    ///
    /// Returns an error when no migration has been created yet.
    pub fn current(&self) -> Result<&Migration, eyre::Report> {
        self.migration
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing migration in scenario world"))
    }
}

impl Default for MigrationWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn backend(name: &str) -> BackendName {
    BackendName::new(name).unwrap_or_else(|err| panic!("invalid backend name {name}: {err}"))
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> MigrationWorld {
    MigrationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
