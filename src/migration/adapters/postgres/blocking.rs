//! Blocking operation helpers shared by the migration `PostgreSQL` adapters.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

use crate::migration::ports::{MappingLedgerError, MigrationRepositoryError, TaskOutcomeLedgerError};

/// `PostgreSQL` connection pool type used by migration adapters.
pub type MigrationPgPool = Pool<ConnectionManager<PgConnection>>;

/// Port error types that can wrap an infrastructure failure.
pub(super) trait PersistenceFailure: Send + 'static {
    fn from_failure(err: impl std::error::Error + Send + Sync + 'static) -> Self;
}

impl PersistenceFailure for MigrationRepositoryError {
    fn from_failure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl PersistenceFailure for MappingLedgerError {
    fn from_failure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

impl PersistenceFailure for TaskOutcomeLedgerError {
    fn from_failure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

/// Runs `f` against a pooled connection on the blocking thread pool.
pub(super) async fn run_blocking<F, T, E>(pool: &MigrationPgPool, f: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: PersistenceFailure,
{
    let shared_pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = shared_pool.get().map_err(E::from_failure)?;
        f(&mut connection)
    })
    .await
    .map_err(E::from_failure)?
}

/// Converts an unsigned counter to its `INTEGER` column representation.
pub(super) fn counter_to_column<E: PersistenceFailure>(value: u32) -> Result<i32, E> {
    i32::try_from(value).map_err(E::from_failure)
}

/// Converts an `INTEGER` column back to an unsigned counter.
pub(super) fn column_to_counter<E: PersistenceFailure>(value: i32) -> Result<u32, E> {
    u32::try_from(value).map_err(E::from_failure)
}
