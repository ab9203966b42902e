//! Migration repository tests against embedded `PostgreSQL`.

use crate::postgres::helpers::{
    CleanupGuard, database_name, ensure_template, new_migration, setup_pool, test_runtime,
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use taskferry::migration::{
    adapters::postgres::PostgresMigrationRepository,
    domain::{MigrationId, MigrationStatus},
    ports::{MigrationRepository, MigrationRepositoryError},
};

#[rstest]
fn store_and_find_round_trip(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("repo_round_trip");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repository = PostgresMigrationRepository::new(
        setup_pool(shared_test_cluster, &db_name).expect("pool setup"),
    );
    let migration = new_migration();
    let rt = test_runtime();

    rt.block_on(repository.store(&migration)).expect("store");
    let found = rt
        .block_on(repository.find_by_id(migration.id()))
        .expect("find_by_id")
        .expect("migration should exist");
    let listed = rt.block_on(repository.list_all()).expect("list_all");

    assert_eq!(found.id(), migration.id());
    assert_eq!(found.status(), MigrationStatus::PendingConfiguration);
    assert_eq!(found.route(), migration.route());
    assert_eq!(listed.len(), 1);
}

#[rstest]
fn store_rejects_duplicate_identifier(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("repo_duplicate");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repository = PostgresMigrationRepository::new(
        setup_pool(shared_test_cluster, &db_name).expect("pool setup"),
    );
    let migration = new_migration();
    let rt = test_runtime();

    rt.block_on(repository.store(&migration)).expect("first store");
    let duplicate = rt.block_on(repository.store(&migration));

    assert!(
        matches!(duplicate, Err(MigrationRepositoryError::DuplicateMigration(id)) if id == migration.id()),
        "expected DuplicateMigration, got {duplicate:?}"
    );
}

#[rstest]
fn guarded_update_with_stale_status_conflicts(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("repo_stale_status");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repository = PostgresMigrationRepository::new(
        setup_pool(shared_test_cluster, &db_name).expect("pool setup"),
    );
    let migration = new_migration();
    let rt = test_runtime();
    rt.block_on(repository.store(&migration)).expect("store");

    let mut winner = migration.clone();
    winner
        .transition_to(MigrationStatus::ReadyToStart, &DefaultClock)
        .expect("promote");
    rt.block_on(repository.update_guarded(&winner, MigrationStatus::PendingConfiguration))
        .expect("first guarded update");

    let mut stale = migration.clone();
    stale
        .transition_to(MigrationStatus::ReadyToStart, &DefaultClock)
        .expect("promote");
    stale
        .transition_to(MigrationStatus::Running, &DefaultClock)
        .expect("run");
    let conflict =
        rt.block_on(repository.update_guarded(&stale, MigrationStatus::PendingConfiguration));
    let stored = rt
        .block_on(repository.find_by_id(migration.id()))
        .expect("find_by_id")
        .expect("migration should exist");

    assert!(
        matches!(
            conflict,
            Err(MigrationRepositoryError::StatusConflict {
                expected: MigrationStatus::PendingConfiguration,
                actual: MigrationStatus::ReadyToStart,
                ..
            })
        ),
        "expected StatusConflict, got {conflict:?}"
    );
    assert_eq!(stored.status(), MigrationStatus::ReadyToStart);
}

#[rstest]
fn guarded_update_of_missing_migration_is_not_found(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("repo_missing");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repository = PostgresMigrationRepository::new(
        setup_pool(shared_test_cluster, &db_name).expect("pool setup"),
    );
    let migration = new_migration();
    let rt = test_runtime();

    let missing =
        rt.block_on(repository.update_guarded(&migration, MigrationStatus::PendingConfiguration));
    let absent = rt
        .block_on(repository.find_by_id(MigrationId::new()))
        .expect("find_by_id");

    assert!(
        matches!(missing, Err(MigrationRepositoryError::NotFound(id)) if id == migration.id()),
        "expected NotFound, got {missing:?}"
    );
    assert!(absent.is_none());
}
