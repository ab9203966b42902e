//! When steps for migration lifecycle BDD scenarios.

use super::world::{
    DESTINATION_LIST, DESTINATION_WORKSPACE, MigrationWorld, SOURCE_PROJECT, run_async,
};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskferry::migration::{
    domain::{MappingKind, Resolution},
    services::CreateMigrationRequest,
};

#[when(r#"the operator maps status "{source_value}" to "{destination_value}""#)]
fn map_status(
    world: &mut MigrationWorld,
    source_value: String,
    destination_value: String,
) -> Result<(), eyre::Report> {
    let migration_id = world.current()?.id();
    let resolution = Resolution::new(MappingKind::Status, source_value, destination_value)?;
    let saved = run_async(world.service.save(migration_id, &[resolution]))
        .wrap_err("save status mapping")?;
    world.migration = Some(saved);
    Ok(())
}

#[when("the operator maps every discovered value")]
fn map_everything(world: &mut MigrationWorld) -> Result<(), eyre::Report> {
    let migration_id = world.current()?.id();
    let state = run_async(world.service.mappings(migration_id)).wrap_err("load mappings")?;
    let resolutions = MappingKind::ALL
        .into_iter()
        .flat_map(|kind| state.records(kind))
        .map(|record| {
            let destination_value = match record.kind() {
                MappingKind::Status => "to do",
                MappingKind::Priority => "high",
                MappingKind::Assignee => "m1",
            };
            Resolution::new(record.kind(), record.source_value(), destination_value)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let saved = run_async(world.service.save(migration_id, &resolutions))
        .wrap_err("save every mapping")?;
    world.migration = Some(saved);
    Ok(())
}

#[when("the migration is started")]
fn start_migration(world: &mut MigrationWorld) -> Result<(), eyre::Report> {
    let migration_id = world.current()?.id();
    let result = run_async(world.service.start(migration_id));
    if let Ok(ref started) = result {
        world.migration = Some(started.clone());
    }
    world.last_start_result = Some(result);
    Ok(())
}

#[when("the execution finishes")]
fn execution_finishes(world: &mut MigrationWorld) -> Result<(), eyre::Report> {
    let migration_id = world.current()?.id();
    let finished = run_async(world.service.wait_for_execution(migration_id))
        .wrap_err("wait for execution")?;
    world.migration = Some(finished);
    Ok(())
}

#[when(r#"a migration from "{source}" to "{destination}" is requested"#)]
fn request_migration(world: &mut MigrationWorld, source: String, destination: String) {
    let request =
        CreateMigrationRequest::new(source, destination, SOURCE_PROJECT, DESTINATION_LIST)
            .with_destination_workspace(DESTINATION_WORKSPACE);
    world.last_create_result = Some(run_async(world.service.create(request)));
}
