//! Shared helpers for `PostgreSQL` adapter integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use taskferry::migration::{
    adapters::postgres::MigrationPgPool,
    domain::{BackendName, Migration, MigrationRoute},
};
use tokio::runtime::Runtime;

/// Boxed error type used by the harness.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// SQL creating the migration tables.
const CREATE_TABLES_SQL: &str =
    include_str!("../../migrations/2026-03-02-000000_create_migration_tables/up.sql");

/// Template database name for the pre-migrated schema.
const TEMPLATE_DB: &str = "taskferry_test_template";

/// Creates a tokio runtime for driving adapter futures in tests.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the schema applied.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_TABLES_SQL)
                .map_err(|e| eyre::eyre!("schema setup failed: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// Creates a database from the template and returns a single-connection
/// pool for it.
pub fn setup_pool(cluster: &TestCluster, db_name: &str) -> Result<MigrationPgPool, BoxError> {
    cluster
        .create_database_from_template(db_name, TEMPLATE_DB)
        .map_err(|e| Box::new(e) as BoxError)?;
    let url = cluster.connection().database_url(db_name);
    let manager = ConnectionManager::<PgConnection>::new(url);
    Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| Box::new(e) as BoxError)
}

/// Returns a fresh database name with the given prefix.
pub fn database_name(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::new_v4().simple())
}

/// Drops the test database when it goes out of scope, even on panic.
///
/// Declare the guard before the pool so the pool's connections close first.
pub struct CleanupGuard<'a> {
    cluster: &'a TestCluster,
    db_name: String,
}

impl<'a> CleanupGuard<'a> {
    /// Creates a guard for `db_name`.
    pub const fn new(cluster: &'a TestCluster, db_name: String) -> Self {
        Self { cluster, db_name }
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// Builds a fresh `pending_configuration` migration from Asana to `ClickUp`.
pub fn new_migration() -> Migration {
    let route = MigrationRoute::new(
        BackendName::new("asana").expect("valid source"),
        BackendName::new("clickup").expect("valid destination"),
        "asana-project",
        "clickup-list",
        "clickup-team",
    )
    .expect("valid route");
    Migration::new(route, &DefaultClock)
}
