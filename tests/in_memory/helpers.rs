//! Shared test helpers for in-memory migration integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskferry::migration::{
    adapters::memory::{
        InMemoryIntegrationProvider, InMemoryMappingLedger, InMemoryMigrationRepository,
        InMemoryOutcomeLedger,
    },
    domain::{BackendName, MappingKind, MigrationId, Resolution, SourceTask, TaskAssignee},
    services::{MigrationService, ProviderRegistry},
};

/// Service type wired to in-memory adapters.
pub type TestService = MigrationService<
    InMemoryMigrationRepository,
    InMemoryMappingLedger,
    InMemoryOutcomeLedger,
    DefaultClock,
>;

/// A service plus handles to the backends registered with it.
pub struct Backends {
    pub service: TestService,
    pub asana: InMemoryIntegrationProvider,
    pub clickup: InMemoryIntegrationProvider,
}

/// Parses a backend name that is known to be valid.
///
/// # Panics
///
/// Panics if `name` fails validation.
#[must_use]
pub fn backend(name: &str) -> BackendName {
    BackendName::new(name).unwrap_or_else(|err| panic!("invalid backend name {name}: {err}"))
}

/// Provides a service with `asana` and `clickup` registered.
#[fixture]
pub fn backends() -> Backends {
    let asana = InMemoryIntegrationProvider::new();
    let clickup = InMemoryIntegrationProvider::new();
    let providers = ProviderRegistry::new()
        .with_provider(backend("asana"), Arc::new(asana.clone()))
        .with_provider(backend("clickup"), Arc::new(clickup.clone()));
    let service = MigrationService::new(
        Arc::new(InMemoryMigrationRepository::new()),
        Arc::new(InMemoryMappingLedger::new()),
        Arc::new(InMemoryOutcomeLedger::new()),
        providers,
        Arc::new(DefaultClock),
    );
    Backends {
        service,
        asana,
        clickup,
    }
}

/// Builds a task with a status and a single assignee.
#[must_use]
pub fn task(id: &str, status: &str, assignee_id: &str) -> SourceTask {
    SourceTask::new(id, format!("Task {id}"))
        .with_status(status)
        .with_assignees([TaskAssignee::new(assignee_id)])
}

/// Resolves every discovered record of a migration with `value_for`.
///
/// # Errors
///
/// Returns an error when the view cannot be built or the save fails.
pub async fn resolve_all(
    service: &TestService,
    migration_id: MigrationId,
    value_for: impl Fn(MappingKind, &str) -> String,
) -> Result<(), eyre::Report> {
    let state = service.mappings(migration_id).await?;
    let resolutions = MappingKind::ALL
        .into_iter()
        .flat_map(|kind| state.records(kind))
        .map(|record| {
            Resolution::new(
                record.kind(),
                record.source_value(),
                value_for(record.kind(), record.source_value()),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    service.save(migration_id, &resolutions).await?;
    Ok(())
}
