//! End-to-end migration flows over in-memory backends.

use super::helpers::{Backends, backend, backends, resolve_all, task};
use mockable::DefaultClock;
use rstest::rstest;
use std::sync::Arc;
use taskferry::migration::{
    adapters::memory::{
        InMemoryIntegrationProvider, InMemoryMappingLedger, InMemoryMigrationRepository,
        InMemoryOutcomeLedger,
    },
    domain::{MappingKind, MigrationStatus, TaskOutcome},
    services::{CreateMigrationRequest, MigrationService, ProviderRegistry},
};

fn request(source_project: &str, destination_list: &str) -> CreateMigrationRequest {
    CreateMigrationRequest::new("asana", "clickup", source_project, destination_list)
        .with_destination_workspace("team-1")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn migrations_keep_separate_ledgers(backends: Backends) -> eyre::Result<()> {
    backends
        .asana
        .seed_tasks("project-a", [task("a1", "Open", "u1")])?;
    backends
        .asana
        .seed_tasks("project-b", [task("b1", "Review", "u2")])?;

    let first = backends.service.create(request("project-a", "list-a")).await?;
    let second = backends.service.create(request("project-b", "list-b")).await?;
    resolve_all(&backends.service, first.id(), |kind, _| match kind {
        MappingKind::Assignee => "m1".to_owned(),
        _ => "to do".to_owned(),
    })
    .await?;

    let first_state = backends.service.mappings(first.id()).await?;
    let second_state = backends.service.mappings(second.id()).await?;

    eyre::ensure!(first_state.pending_count() == 0, "first migration fully mapped");
    eyre::ensure!(second_state.pending_count() == 2, "second migration untouched");
    eyre::ensure!(
        second_state
            .statuses
            .iter()
            .all(|record| record.source_value() == "Review"),
        "ledgers leaked across migrations"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resolutions_survive_resync(backends: Backends) -> eyre::Result<()> {
    backends
        .asana
        .seed_tasks("project-a", [task("a1", "Open", "u1")])?;
    let migration = backends.service.create(request("project-a", "list-a")).await?;
    resolve_all(&backends.service, migration.id(), |_, value| {
        format!("mapped-{value}")
    })
    .await?;
    backends
        .asana
        .push_task("project-a", task("a2", "Open", "u3"))?;

    let inserted = backends.service.sync(migration.id()).await?;
    let state = backends.service.mappings(migration.id()).await?;

    eyre::ensure!(inserted == 1, "only the new assignee is discovered");
    let open = state
        .statuses
        .iter()
        .find(|record| record.source_value() == "Open")
        .ok_or_else(|| eyre::eyre!("status record missing"))?;
    eyre::ensure!(
        open.destination_value() == Some("mapped-Open"),
        "resync overwrote a resolution"
    );
    eyre::ensure!(state.pending_count() == 1, "new assignee should be pending");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outcomes_record_destination_ids(backends: Backends) -> eyre::Result<()> {
    backends.asana.seed_tasks(
        "project-a",
        [task("a1", "Open", "u1"), task("a2", "Open", "u1")],
    )?;
    let migration = backends.service.create(request("project-a", "list-a")).await?;
    resolve_all(&backends.service, migration.id(), |_, _| "x".to_owned()).await?;

    backends.service.start(migration.id()).await?;
    let finished = backends.service.wait_for_execution(migration.id()).await?;
    let outcomes = backends.service.outcomes(migration.id()).await?;
    let created = backends.clickup.created_tasks()?;

    eyre::ensure!(finished.status() == MigrationStatus::Completed, "pass completes");
    eyre::ensure!(outcomes.len() == 2, "one outcome per task");
    for (outcome, call) in outcomes.iter().zip(&created) {
        eyre::ensure!(outcome.outcome() == TaskOutcome::Success, "task failed");
        eyre::ensure!(
            outcome.destination_task_id() == Some(call.created_id.as_str()),
            "outcome does not reference the created task"
        );
        eyre::ensure!(call.container_id == "list-a", "wrong destination list");
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_backend_can_be_both_ends() -> eyre::Result<()> {
    let asana = InMemoryIntegrationProvider::new();
    let service = MigrationService::new(
        Arc::new(InMemoryMigrationRepository::new()),
        Arc::new(InMemoryMappingLedger::new()),
        Arc::new(InMemoryOutcomeLedger::new()),
        ProviderRegistry::new().with_provider(backend("asana"), Arc::new(asana.clone())),
        Arc::new(DefaultClock),
    );
    asana.seed_tasks("project-a", [task("a1", "Open", "u1")])?;

    let migration = service
        .create(
            CreateMigrationRequest::new("asana", "asana", "project-a", "project-b")
                .with_destination_workspace("workspace-1"),
        )
        .await?;
    resolve_all(&service, migration.id(), |_, value| value.to_owned()).await?;
    service.start(migration.id()).await?;
    let finished = service.wait_for_execution(migration.id()).await?;
    let created = asana.created_tasks()?;

    eyre::ensure!(finished.status() == MigrationStatus::Completed, "pass completes");
    eyre::ensure!(created.len() == 1, "task copied once");
    eyre::ensure!(
        created.iter().all(|call| call.container_id == "project-b"),
        "task copied into the wrong container"
    );
    Ok(())
}
