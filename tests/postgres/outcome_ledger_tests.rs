//! Task outcome ledger tests against embedded `PostgreSQL`.

use crate::postgres::helpers::{
    CleanupGuard, database_name, ensure_template, new_migration, setup_pool, test_runtime,
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use taskferry::migration::{
    adapters::postgres::{PostgresMigrationRepository, PostgresOutcomeLedger},
    domain::{TaskOutcome, TaskOutcomeRecord},
    ports::{MigrationRepository, TaskOutcomeLedger},
};

#[rstest]
fn outcomes_list_in_append_order(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("outcomes_order");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let pool = setup_pool(shared_test_cluster, &db_name).expect("pool setup");
    let rt = test_runtime();
    let migration = new_migration();
    rt.block_on(PostgresMigrationRepository::new(pool.clone()).store(&migration))
        .expect("store migration");
    let ledger = PostgresOutcomeLedger::new(pool);

    rt.block_on(ledger.append(&TaskOutcomeRecord::success(
        migration.id(),
        "t1",
        "dest-1",
        &DefaultClock,
    )))
    .expect("append success");
    rt.block_on(ledger.append(&TaskOutcomeRecord::failure(
        migration.id(),
        "t2",
        "destination rejected task",
        &DefaultClock,
    )))
    .expect("append failure");
    let outcomes = rt
        .block_on(ledger.list_for_migration(migration.id()))
        .expect("list");

    let summary: Vec<(&str, TaskOutcome, Option<&str>)> = outcomes
        .iter()
        .map(|record| {
            (
                record.source_task_id(),
                record.outcome(),
                record.destination_task_id(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("t1", TaskOutcome::Success, Some("dest-1")),
            ("t2", TaskOutcome::Failed, None),
        ]
    );
    assert_eq!(
        outcomes.get(1).and_then(TaskOutcomeRecord::error),
        Some("destination rejected task")
    );
}
