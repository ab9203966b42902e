//! `PostgreSQL` task outcome ledger.

use super::{
    blocking::{MigrationPgPool, run_blocking},
    models::{NewOutcomeRow, OutcomeRow},
    schema::task_outcomes,
};
use crate::migration::{
    domain::{MigrationId, OutcomeId, PersistedOutcomeData, TaskOutcome, TaskOutcomeRecord},
    ports::{TaskOutcomeLedger, TaskOutcomeLedgerError, TaskOutcomeLedgerResult},
};
use async_trait::async_trait;
use diesel::prelude::*;

/// `PostgreSQL`-backed append-only outcome ledger.
#[derive(Debug, Clone)]
pub struct PostgresOutcomeLedger {
    pool: MigrationPgPool,
}

impl PostgresOutcomeLedger {
    /// Creates a new ledger from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: MigrationPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskOutcomeLedger for PostgresOutcomeLedger {
    async fn append(&self, record: &TaskOutcomeRecord) -> TaskOutcomeLedgerResult<()> {
        let new_row = to_new_row(record);

        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(task_outcomes::table)
                .values(&new_row)
                .execute(connection)
                .map_err(TaskOutcomeLedgerError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn list_for_migration(
        &self,
        migration_id: MigrationId,
    ) -> TaskOutcomeLedgerResult<Vec<TaskOutcomeRecord>> {
        run_blocking(&self.pool, move |connection| {
            let rows = task_outcomes::table
                .filter(task_outcomes::migration_id.eq(migration_id.into_inner()))
                .order(task_outcomes::sequence.asc())
                .select(OutcomeRow::as_select())
                .load::<OutcomeRow>(connection)
                .map_err(TaskOutcomeLedgerError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }
}

pub(super) fn to_new_row(record: &TaskOutcomeRecord) -> NewOutcomeRow {
    NewOutcomeRow {
        id: record.id().into_inner(),
        migration_id: record.migration_id().into_inner(),
        source_task_id: record.source_task_id().to_owned(),
        destination_task_id: record.destination_task_id().map(str::to_owned),
        outcome: record.outcome().as_str().to_owned(),
        error: record.error().map(str::to_owned),
        recorded_at: record.recorded_at(),
    }
}

pub(super) fn row_to_record(row: OutcomeRow) -> TaskOutcomeLedgerResult<TaskOutcomeRecord> {
    let outcome = TaskOutcome::try_from(row.outcome.as_str())
        .map_err(TaskOutcomeLedgerError::persistence)?;
    Ok(TaskOutcomeRecord::from_persisted(PersistedOutcomeData {
        id: OutcomeId::from_uuid(row.id),
        migration_id: MigrationId::from_uuid(row.migration_id),
        source_task_id: row.source_task_id,
        destination_task_id: row.destination_task_id,
        outcome,
        error: row.error,
        recorded_at: row.recorded_at,
    }))
}
