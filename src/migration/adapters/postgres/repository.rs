//! `PostgreSQL` repository implementation for migration aggregates.

use super::{
    blocking::{MigrationPgPool, column_to_counter, counter_to_column, run_blocking},
    models::{MigrationChangeset, MigrationRow, NewMigrationRow},
    schema::migrations,
};
use crate::migration::{
    domain::{
        BackendName, Migration, MigrationId, MigrationProgress, MigrationRoute, MigrationStatus,
        PersistedMigrationData,
    },
    ports::{MigrationRepository, MigrationRepositoryError, MigrationRepositoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed migration repository.
#[derive(Debug, Clone)]
pub struct PostgresMigrationRepository {
    pool: MigrationPgPool,
}

impl PostgresMigrationRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: MigrationPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MigrationRepository for PostgresMigrationRepository {
    async fn store(&self, migration: &Migration) -> MigrationRepositoryResult<()> {
        let migration_id = migration.id();
        let new_row = to_new_row(migration)?;

        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(migrations::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        MigrationRepositoryError::DuplicateMigration(migration_id)
                    }
                    _ => MigrationRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_guarded(
        &self,
        migration: &Migration,
        expected: MigrationStatus,
    ) -> MigrationRepositoryResult<()> {
        let migration_id = migration.id();
        let changeset = to_changeset(migration)?;

        run_blocking(&self.pool, move |connection| {
            let affected = diesel::update(
                migrations::table
                    .filter(migrations::id.eq(migration_id.into_inner()))
                    .filter(migrations::status.eq(expected.as_str())),
            )
            .set(&changeset)
            .execute(connection)
            .map_err(MigrationRepositoryError::persistence)?;
            if affected > 0 {
                return Ok(());
            }

            let current = migrations::table
                .find(migration_id.into_inner())
                .select(migrations::status)
                .first::<String>(connection)
                .optional()
                .map_err(MigrationRepositoryError::persistence)?;
            match current {
                None => Err(MigrationRepositoryError::NotFound(migration_id)),
                Some(actual) => Err(MigrationRepositoryError::StatusConflict {
                    id: migration_id,
                    expected,
                    actual: MigrationStatus::try_from(actual.as_str())
                        .map_err(MigrationRepositoryError::persistence)?,
                }),
            }
        })
        .await
    }

    async fn find_by_id(&self, id: MigrationId) -> MigrationRepositoryResult<Option<Migration>> {
        run_blocking(&self.pool, move |connection| {
            let row = migrations::table
                .find(id.into_inner())
                .select(MigrationRow::as_select())
                .first::<MigrationRow>(connection)
                .optional()
                .map_err(MigrationRepositoryError::persistence)?;
            row.map(row_to_migration).transpose()
        })
        .await
    }

    async fn list_all(&self) -> MigrationRepositoryResult<Vec<Migration>> {
        run_blocking(&self.pool, move |connection| {
            let rows = migrations::table
                .order((migrations::created_at.desc(), migrations::id.desc()))
                .select(MigrationRow::as_select())
                .load::<MigrationRow>(connection)
                .map_err(MigrationRepositoryError::persistence)?;
            rows.into_iter().map(row_to_migration).collect()
        })
        .await
    }
}

pub(super) fn to_new_row(migration: &Migration) -> MigrationRepositoryResult<NewMigrationRow> {
    let route = migration.route();
    let progress = migration.progress();
    Ok(NewMigrationRow {
        id: migration.id().into_inner(),
        source_backend: route.source().as_str().to_owned(),
        destination_backend: route.destination().as_str().to_owned(),
        source_project_id: route.source_project_id().to_owned(),
        destination_list_id: route.destination_list_id().to_owned(),
        destination_workspace_id: route.destination_workspace_id().to_owned(),
        status: migration.status().as_str().to_owned(),
        total_tasks: counter_to_column(progress.total)?,
        completed_tasks: counter_to_column(progress.completed)?,
        failed_tasks: counter_to_column(progress.failed)?,
        created_at: migration.created_at(),
        updated_at: migration.updated_at(),
        completed_at: migration.completed_at(),
    })
}

pub(super) fn to_changeset(migration: &Migration) -> MigrationRepositoryResult<MigrationChangeset> {
    let progress = migration.progress();
    Ok(MigrationChangeset {
        status: migration.status().as_str().to_owned(),
        total_tasks: counter_to_column(progress.total)?,
        completed_tasks: counter_to_column(progress.completed)?,
        failed_tasks: counter_to_column(progress.failed)?,
        updated_at: migration.updated_at(),
        completed_at: migration.completed_at(),
    })
}

pub(super) fn row_to_migration(row: MigrationRow) -> MigrationRepositoryResult<Migration> {
    let MigrationRow {
        id,
        source_backend,
        destination_backend,
        source_project_id,
        destination_list_id,
        destination_workspace_id,
        status: persisted_status,
        total_tasks,
        completed_tasks,
        failed_tasks,
        created_at,
        updated_at,
        completed_at,
    } = row;

    let source = BackendName::new(source_backend).map_err(MigrationRepositoryError::persistence)?;
    let destination =
        BackendName::new(destination_backend).map_err(MigrationRepositoryError::persistence)?;
    let route = MigrationRoute::new(
        source,
        destination,
        source_project_id,
        destination_list_id,
        destination_workspace_id,
    )
    .map_err(MigrationRepositoryError::persistence)?;
    let status = MigrationStatus::try_from(persisted_status.as_str())
        .map_err(MigrationRepositoryError::persistence)?;
    let progress = MigrationProgress {
        total: column_to_counter(total_tasks)?,
        completed: column_to_counter(completed_tasks)?,
        failed: column_to_counter(failed_tasks)?,
    };

    Ok(Migration::from_persisted(PersistedMigrationData {
        id: MigrationId::from_uuid(id),
        route,
        status,
        progress,
        created_at,
        updated_at,
        completed_at,
    }))
}
