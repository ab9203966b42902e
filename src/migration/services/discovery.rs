//! Discovery of distinct source attribute values.

use super::error::{MigrationServiceError, MigrationServiceResult};
use crate::migration::{
    domain::{AssigneeMetadata, MappingKind, MappingRecord, MigrationId, SourceTask},
    ports::{IntegrationProvider, MappingLedger},
};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;

/// Result of one discovery run.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredTasks {
    /// Every task the source returned, in source order.
    pub tasks: Vec<SourceTask>,
    /// Number of mapping records newly added to the ledger.
    pub inserted: usize,
}

/// Seeds the mapping ledger with values observed in the source task set.
pub struct MappingDiscovery<L, C>
where
    L: MappingLedger,
    C: Clock + Send + Sync,
{
    ledger: Arc<L>,
    clock: Arc<C>,
}

impl<L, C> Clone for MappingDiscovery<L, C>
where
    L: MappingLedger,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<L, C> MappingDiscovery<L, C>
where
    L: MappingLedger,
    C: Clock + Send + Sync,
{
    /// Creates a discovery component over a mapping ledger.
    #[must_use]
    pub const fn new(ledger: Arc<L>, clock: Arc<C>) -> Self {
        Self { ledger, clock }
    }

    /// Fetches the full task set of a source container.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationServiceError::SourceUnavailable`] when the source
    /// cannot list its tasks.
    pub async fn fetch(
        &self,
        source: &dyn IntegrationProvider,
        source_project_id: &str,
    ) -> MigrationServiceResult<Vec<SourceTask>> {
        source
            .fetch_tasks(source_project_id)
            .await
            .map_err(MigrationServiceError::SourceUnavailable)
    }

    /// Inserts pending records for values not yet known to the ledger.
    ///
    /// Existing records, resolved or not, are left untouched.
    ///
    /// # Errors
    ///
    /// Returns ledger persistence errors.
    pub async fn seed(
        &self,
        migration_id: MigrationId,
        tasks: &[SourceTask],
    ) -> MigrationServiceResult<usize> {
        let candidates = distinct_values(migration_id, tasks, &*self.clock);
        let inserted = self.ledger.insert_pending(&candidates).await?;
        tracing::debug!(
            migration_id = %migration_id,
            observed = candidates.len(),
            inserted,
            "seeded mapping ledger"
        );
        Ok(inserted)
    }

    /// Fetches the source task set and seeds the ledger from it.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationServiceError::SourceUnavailable`] when the fetch
    /// fails, or ledger persistence errors.
    pub async fn discover(
        &self,
        migration_id: MigrationId,
        source: &dyn IntegrationProvider,
        source_project_id: &str,
    ) -> MigrationServiceResult<DiscoveredTasks> {
        let tasks = self.fetch(source, source_project_id).await?;
        let inserted = self.seed(migration_id, &tasks).await?;
        Ok(DiscoveredTasks { tasks, inserted })
    }
}

/// Builds one pending record per distinct non-empty status, priority, and
/// assignee identifier. The first-seen assignee details win.
fn distinct_values(
    migration_id: MigrationId,
    tasks: &[SourceTask],
    clock: &impl Clock,
) -> Vec<MappingRecord> {
    let mut seen: HashSet<(MappingKind, &str)> = HashSet::new();
    let mut records = Vec::new();

    for task in tasks {
        for (kind, value) in [
            (MappingKind::Status, task.status.as_str()),
            (MappingKind::Priority, task.priority.as_str()),
        ] {
            if !value.is_empty() && seen.insert((kind, value)) {
                records.push(MappingRecord::pending(migration_id, kind, value, None, clock));
            }
        }

        for assignee in &task.assignees {
            if assignee.id.is_empty() || !seen.insert((MappingKind::Assignee, &assignee.id)) {
                continue;
            }
            let metadata = AssigneeMetadata {
                name: assignee.name.clone(),
                email: assignee.email.clone(),
            };
            records.push(MappingRecord::pending(
                migration_id,
                MappingKind::Assignee,
                assignee.id.as_str(),
                Some(metadata),
                clock,
            ));
        }
    }
    records
}
