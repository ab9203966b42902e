//! `PostgreSQL` mapping ledger.

use super::{
    blocking::{MigrationPgPool, run_blocking},
    models::{MappingRow, NewMappingRow},
    schema::migration_mappings,
};
use crate::migration::{
    domain::{
        AssigneeMetadata, MappingId, MappingKind, MappingRecord, MappingStatus, MigrationId,
        PersistedMappingData, Resolution,
    },
    ports::{MappingLedger, MappingLedgerError, MappingLedgerResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// `PostgreSQL`-backed mapping ledger.
///
/// Uniqueness of (migration, kind, source value) is enforced by the
/// `migration_mappings_source_unique` constraint; inserts skip conflicting
/// rows instead of failing.
#[derive(Debug, Clone)]
pub struct PostgresMappingLedger {
    pool: MigrationPgPool,
}

impl PostgresMappingLedger {
    /// Creates a new ledger from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: MigrationPgPool) -> Self {
        Self { pool }
    }
}

impl From<diesel::result::Error> for MappingLedgerError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl MappingLedger for PostgresMappingLedger {
    async fn insert_pending(&self, records: &[MappingRecord]) -> MappingLedgerResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let rows = records
            .iter()
            .map(to_new_row)
            .collect::<MappingLedgerResult<Vec<_>>>()?;

        run_blocking(&self.pool, move |connection| {
            let inserted = diesel::insert_into(migration_mappings::table)
                .values(&rows)
                .on_conflict((
                    migration_mappings::migration_id,
                    migration_mappings::kind,
                    migration_mappings::source_value,
                ))
                .do_nothing()
                .execute(connection)?;
            Ok(inserted)
        })
        .await
    }

    async fn apply_resolutions(
        &self,
        migration_id: MigrationId,
        resolutions: &[Resolution],
        resolved_at: DateTime<Utc>,
    ) -> MappingLedgerResult<()> {
        let pending_writes = resolutions.to_vec();

        run_blocking(&self.pool, move |connection| {
            connection.transaction::<_, MappingLedgerError, _>(|tx| {
                for resolution in &pending_writes {
                    let affected = diesel::update(
                        migration_mappings::table
                            .filter(migration_mappings::migration_id.eq(migration_id.into_inner()))
                            .filter(migration_mappings::kind.eq(resolution.kind().as_str()))
                            .filter(migration_mappings::source_value.eq(resolution.source_value())),
                    )
                    .set((
                        migration_mappings::destination_value
                            .eq(Some(resolution.destination_value())),
                        migration_mappings::status.eq(MappingStatus::Mapped.as_str()),
                        migration_mappings::updated_at.eq(resolved_at),
                    ))
                    .execute(tx)?;

                    if affected == 0 {
                        return Err(MappingLedgerError::MappingNotFound {
                            migration_id,
                            kind: resolution.kind(),
                            source_value: resolution.source_value().to_owned(),
                        });
                    }
                }
                Ok(())
            })
        })
        .await
    }

    async fn list_for_migration(
        &self,
        migration_id: MigrationId,
    ) -> MappingLedgerResult<Vec<MappingRecord>> {
        run_blocking(&self.pool, move |connection| {
            let rows = migration_mappings::table
                .filter(migration_mappings::migration_id.eq(migration_id.into_inner()))
                .order(migration_mappings::sequence.asc())
                .select(MappingRow::as_select())
                .load::<MappingRow>(connection)?;
            let mut records = rows
                .into_iter()
                .map(row_to_record)
                .collect::<MappingLedgerResult<Vec<_>>>()?;
            records.sort_by_key(MappingRecord::kind);
            Ok(records)
        })
        .await
    }

    async fn count_pending(&self, migration_id: MigrationId) -> MappingLedgerResult<usize> {
        run_blocking(&self.pool, move |connection| {
            let pending: i64 = migration_mappings::table
                .filter(migration_mappings::migration_id.eq(migration_id.into_inner()))
                .filter(migration_mappings::status.eq(MappingStatus::Pending.as_str()))
                .count()
                .get_result(connection)?;
            usize::try_from(pending).map_err(MappingLedgerError::persistence)
        })
        .await
    }
}

pub(super) fn to_new_row(record: &MappingRecord) -> MappingLedgerResult<NewMappingRow> {
    let metadata = record
        .metadata()
        .map(serde_json::to_value)
        .transpose()
        .map_err(MappingLedgerError::persistence)?;

    Ok(NewMappingRow {
        id: record.id().into_inner(),
        migration_id: record.migration_id().into_inner(),
        kind: record.kind().as_str().to_owned(),
        source_value: record.source_value().to_owned(),
        destination_value: record.destination_value().map(str::to_owned),
        status: record.status().as_str().to_owned(),
        metadata,
        created_at: record.created_at(),
        updated_at: record.updated_at(),
    })
}

pub(super) fn row_to_record(row: MappingRow) -> MappingLedgerResult<MappingRecord> {
    let MappingRow {
        id,
        migration_id,
        kind: persisted_kind,
        source_value,
        destination_value,
        status: persisted_status,
        metadata: persisted_metadata,
        created_at,
        updated_at,
    } = row;

    let kind =
        MappingKind::try_from(persisted_kind.as_str()).map_err(MappingLedgerError::persistence)?;
    let status = MappingStatus::try_from(persisted_status.as_str())
        .map_err(MappingLedgerError::persistence)?;
    let metadata = persisted_metadata
        .map(serde_json::from_value::<AssigneeMetadata>)
        .transpose()
        .map_err(MappingLedgerError::persistence)?;

    Ok(MappingRecord::from_persisted(PersistedMappingData {
        id: MappingId::from_uuid(id),
        migration_id: MigrationId::from_uuid(migration_id),
        kind,
        source_value,
        destination_value,
        status,
        metadata,
        created_at,
        updated_at,
    }))
}
