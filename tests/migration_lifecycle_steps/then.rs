//! Then steps for migration lifecycle BDD scenarios.

use super::world::{MigrationWorld, run_async};
use rstest_bdd_macros::then;
use taskferry::migration::{
    domain::{MigrationStatus, TaskOutcome},
    services::MigrationServiceError,
};

#[then("the start fails with {pending:usize} pending mappings")]
fn start_fails_with_pending(world: &MigrationWorld, pending: usize) -> Result<(), eyre::Report> {
    let result = world
        .last_start_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing start result"))?;

    match result {
        Err(MigrationServiceError::MappingsIncomplete { pending: actual, .. })
            if *actual == pending =>
        {
            Ok(())
        }
        other => Err(eyre::eyre!(
            "expected MappingsIncomplete with {pending} pending, got {other:?}"
        )),
    }
}

#[then(r#"the migration status is "{status}""#)]
fn migration_status_is(world: &MigrationWorld, status: String) -> Result<(), eyre::Report> {
    let expected = MigrationStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let migration_id = world.current()?.id();
    let stored = run_async(world.service.get(migration_id))?;

    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            stored.status().as_str()
        ));
    }
    Ok(())
}

#[then("{count:usize} tasks were created on the destination")]
fn tasks_created(world: &MigrationWorld, count: usize) -> Result<(), eyre::Report> {
    let created = world.destination.created_tasks()?;
    eyre::ensure!(
        created.len() == count,
        "expected {count} created tasks, found {}",
        created.len()
    );
    Ok(())
}

#[then(r#"the outcome for task "{task_id}" is "{outcome}""#)]
fn outcome_for_task(
    world: &MigrationWorld,
    task_id: String,
    outcome: String,
) -> Result<(), eyre::Report> {
    let expected = TaskOutcome::try_from(outcome.as_str())
        .map_err(|err| eyre::eyre!("invalid expected outcome in scenario: {err}"))?;
    let migration_id = world.current()?.id();
    let outcomes = run_async(world.service.outcomes(migration_id))?;
    let record = outcomes
        .iter()
        .find(|record| record.source_task_id() == task_id)
        .ok_or_else(|| eyre::eyre!("no outcome recorded for task {task_id}"))?;

    eyre::ensure!(
        record.outcome() == expected,
        "expected outcome {}, found {}",
        expected.as_str(),
        record.outcome().as_str()
    );
    Ok(())
}

#[then("the request fails because the source is unavailable")]
fn request_fails_source_unavailable(world: &MigrationWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_create_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing create result"))?;

    if !matches!(result, Err(MigrationServiceError::SourceUnavailable(_))) {
        return Err(eyre::eyre!("expected SourceUnavailable, got {result:?}"));
    }
    Ok(())
}

#[then("no migration is stored")]
fn no_migration_stored(world: &MigrationWorld) -> Result<(), eyre::Report> {
    let stored = run_async(world.service.list())?;
    eyre::ensure!(stored.is_empty(), "expected no migrations, found {}", stored.len());
    Ok(())
}
