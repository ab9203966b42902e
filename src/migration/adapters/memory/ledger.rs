//! In-memory mapping and task outcome ledgers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::migration::{
    domain::{MappingRecord, MigrationId, Resolution, TaskOutcomeRecord},
    ports::{
        MappingLedger, MappingLedgerError, MappingLedgerResult, TaskOutcomeLedger,
        TaskOutcomeLedgerError, TaskOutcomeLedgerResult,
    },
};
use chrono::{DateTime, Utc};

/// Thread-safe in-memory mapping ledger.
///
/// Records are kept per migration in discovery order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMappingLedger {
    state: Arc<RwLock<HashMap<MigrationId, Vec<MappingRecord>>>>,
}

impl InMemoryMappingLedger {
    /// Creates an empty in-memory ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn mapping_lock_error(err: impl std::fmt::Display) -> MappingLedgerError {
    MappingLedgerError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl MappingLedger for InMemoryMappingLedger {
    async fn insert_pending(&self, records: &[MappingRecord]) -> MappingLedgerResult<usize> {
        let mut state = self.state.write().map_err(mapping_lock_error)?;
        let mut inserted = 0;
        for record in records {
            let existing = state.entry(record.migration_id()).or_default();
            let is_known = existing.iter().any(|known| {
                known.kind() == record.kind() && known.source_value() == record.source_value()
            });
            if !is_known {
                existing.push(record.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn apply_resolutions(
        &self,
        migration_id: MigrationId,
        resolutions: &[Resolution],
        resolved_at: DateTime<Utc>,
    ) -> MappingLedgerResult<()> {
        let mut state = self.state.write().map_err(mapping_lock_error)?;
        let records = state.entry(migration_id).or_default();

        let mut targets = Vec::with_capacity(resolutions.len());
        for resolution in resolutions {
            let index = records
                .iter()
                .position(|record| record.matches(resolution))
                .ok_or_else(|| MappingLedgerError::MappingNotFound {
                    migration_id,
                    kind: resolution.kind(),
                    source_value: resolution.source_value().to_owned(),
                })?;
            targets.push((index, resolution.destination_value()));
        }

        for (index, destination_value) in targets {
            if let Some(record) = records.get_mut(index) {
                record.resolve(destination_value, resolved_at);
            }
        }
        Ok(())
    }

    async fn list_for_migration(
        &self,
        migration_id: MigrationId,
    ) -> MappingLedgerResult<Vec<MappingRecord>> {
        let state = self.state.read().map_err(mapping_lock_error)?;
        let mut records = state.get(&migration_id).cloned().unwrap_or_default();
        records.sort_by_key(MappingRecord::kind);
        Ok(records)
    }

    async fn count_pending(&self, migration_id: MigrationId) -> MappingLedgerResult<usize> {
        let state = self.state.read().map_err(mapping_lock_error)?;
        Ok(state
            .get(&migration_id)
            .map(|records| records.iter().filter(|record| record.is_pending()).count())
            .unwrap_or_default())
    }
}

/// Thread-safe in-memory task outcome ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOutcomeLedger {
    state: Arc<RwLock<Vec<TaskOutcomeRecord>>>,
}

impl InMemoryOutcomeLedger {
    /// Creates an empty in-memory ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn outcome_lock_error(err: impl std::fmt::Display) -> TaskOutcomeLedgerError {
    TaskOutcomeLedgerError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskOutcomeLedger for InMemoryOutcomeLedger {
    async fn append(&self, record: &TaskOutcomeRecord) -> TaskOutcomeLedgerResult<()> {
        let mut state = self.state.write().map_err(outcome_lock_error)?;
        state.push(record.clone());
        Ok(())
    }

    async fn list_for_migration(
        &self,
        migration_id: MigrationId,
    ) -> TaskOutcomeLedgerResult<Vec<TaskOutcomeRecord>> {
        let state = self.state.read().map_err(outcome_lock_error)?;
        Ok(state
            .iter()
            .filter(|record| record.migration_id() == migration_id)
            .cloned()
            .collect())
    }
}
