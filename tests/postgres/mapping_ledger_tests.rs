//! Mapping ledger tests against embedded `PostgreSQL`.

use crate::postgres::helpers::{
    CleanupGuard, database_name, ensure_template, new_migration, setup_pool, test_runtime,
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use taskferry::migration::{
    adapters::postgres::{MigrationPgPool, PostgresMappingLedger, PostgresMigrationRepository},
    domain::{AssigneeMetadata, MappingKind, MappingRecord, Migration, Resolution},
    ports::{MappingLedger, MappingLedgerError, MigrationRepository},
};
use tokio::runtime::Runtime;

/// Stores a migration so mapping rows satisfy their foreign key.
fn stored_migration(rt: &Runtime, pool: &MigrationPgPool) -> Migration {
    let migration = new_migration();
    rt.block_on(PostgresMigrationRepository::new(pool.clone()).store(&migration))
        .expect("store migration");
    migration
}

fn pending(migration: &Migration, kind: MappingKind, value: &str) -> MappingRecord {
    MappingRecord::pending(migration.id(), kind, value, None, &DefaultClock)
}

#[rstest]
fn duplicate_pending_inserts_are_ignored(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("ledger_duplicates");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let pool = setup_pool(shared_test_cluster, &db_name).expect("pool setup");
    let rt = test_runtime();
    let migration = stored_migration(&rt, &pool);
    let ledger = PostgresMappingLedger::new(pool);

    let first = rt
        .block_on(ledger.insert_pending(&[
            pending(&migration, MappingKind::Status, "Open"),
            pending(&migration, MappingKind::Priority, "High"),
        ]))
        .expect("first insert");
    let second = rt
        .block_on(ledger.insert_pending(&[
            pending(&migration, MappingKind::Status, "Open"),
            pending(&migration, MappingKind::Status, "Done"),
        ]))
        .expect("second insert");
    let records = rt
        .block_on(ledger.list_for_migration(migration.id()))
        .expect("list");

    assert_eq!(first, 2);
    assert_eq!(second, 1, "only the unseen value should be inserted");
    let values: Vec<&str> = records.iter().map(MappingRecord::source_value).collect();
    assert_eq!(values, vec!["Open", "High", "Done"]);
}

#[rstest]
fn unknown_resolution_rolls_back_the_whole_batch(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("ledger_rollback");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let pool = setup_pool(shared_test_cluster, &db_name).expect("pool setup");
    let rt = test_runtime();
    let migration = stored_migration(&rt, &pool);
    let ledger = PostgresMappingLedger::new(pool);
    rt.block_on(ledger.insert_pending(&[
        pending(&migration, MappingKind::Status, "Open"),
        pending(&migration, MappingKind::Status, "Done"),
    ]))
    .expect("insert");

    let result = rt.block_on(ledger.apply_resolutions(
        migration.id(),
        &[
            Resolution::new(MappingKind::Status, "Open", "to do").expect("valid resolution"),
            Resolution::new(MappingKind::Status, "Archived", "closed").expect("valid resolution"),
        ],
        chrono::Utc::now(),
    ));
    let pending_count = rt
        .block_on(ledger.count_pending(migration.id()))
        .expect("count");
    let records = rt
        .block_on(ledger.list_for_migration(migration.id()))
        .expect("list");

    assert!(
        matches!(
            &result,
            Err(MappingLedgerError::MappingNotFound { kind: MappingKind::Status, source_value, .. })
                if source_value == "Archived"
        ),
        "expected MappingNotFound, got {result:?}"
    );
    assert_eq!(pending_count, 2, "no resolution may survive the rollback");
    assert!(records.iter().all(|record| record.destination_value().is_none()));
}

#[rstest]
fn resolutions_apply_together_and_keep_metadata(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("ledger_apply");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let pool = setup_pool(shared_test_cluster, &db_name).expect("pool setup");
    let rt = test_runtime();
    let migration = stored_migration(&rt, &pool);
    let ledger = PostgresMappingLedger::new(pool);
    let metadata = AssigneeMetadata {
        name: "User One".to_owned(),
        email: "u1@example.com".to_owned(),
    };
    rt.block_on(ledger.insert_pending(&[
        pending(&migration, MappingKind::Status, "Open"),
        MappingRecord::pending(
            migration.id(),
            MappingKind::Assignee,
            "u1",
            Some(metadata.clone()),
            &DefaultClock,
        ),
    ]))
    .expect("insert");

    rt.block_on(ledger.apply_resolutions(
        migration.id(),
        &[
            Resolution::new(MappingKind::Status, "Open", "to do").expect("valid resolution"),
            Resolution::new(MappingKind::Assignee, "u1", "m1").expect("valid resolution"),
        ],
        chrono::Utc::now(),
    ))
    .expect("apply");
    let records = rt
        .block_on(ledger.list_for_migration(migration.id()))
        .expect("list");
    let assignee = records
        .iter()
        .find(|record| record.kind() == MappingKind::Assignee)
        .expect("assignee record");

    assert_eq!(
        rt.block_on(ledger.count_pending(migration.id()))
            .expect("count"),
        0
    );
    assert_eq!(assignee.destination_value(), Some("m1"));
    assert_eq!(assignee.metadata(), Some(&metadata));
}
