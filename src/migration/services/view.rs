//! Read-side assembly of the mapping resolution view.

use super::error::{MigrationServiceError, MigrationServiceResult};
use crate::migration::{
    domain::{MappingKind, MappingRecord, Member, Migration, default_priorities},
    ports::{IntegrationProvider, MappingLedger},
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Everything an operator needs to resolve a migration's mappings.
///
/// Always recomputed from the ledger and live destination state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingsState {
    /// The migration the view was built for.
    pub migration: Migration,
    /// Discovered status values.
    pub statuses: Vec<MappingRecord>,
    /// Discovered priority values.
    pub priorities: Vec<MappingRecord>,
    /// Discovered assignee identifiers.
    pub assignees: Vec<MappingRecord>,
    /// Members of the destination workspace.
    pub destination_members: Vec<Member>,
    /// Status labels of the destination container.
    pub destination_statuses: Vec<String>,
    /// Priority names accepted by the destination container.
    pub destination_priorities: Vec<String>,
    /// Destination member id per pending source assignee whose email matches
    /// that member's email.
    ///
    /// Suggestions are advisory and only take effect once saved.
    pub suggested_assignees: BTreeMap<String, String>,
}

impl MappingsState {
    /// Returns the records of one kind.
    #[must_use]
    pub fn records(&self, kind: MappingKind) -> &[MappingRecord] {
        match kind {
            MappingKind::Status => &self.statuses,
            MappingKind::Priority => &self.priorities,
            MappingKind::Assignee => &self.assignees,
        }
    }

    /// Returns the number of records still awaiting resolution.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        MappingKind::ALL
            .into_iter()
            .flat_map(|kind| self.records(kind))
            .filter(|record| record.is_pending())
            .count()
    }
}

/// Builds [`MappingsState`] views.
pub struct MappingViewBuilder<L>
where
    L: MappingLedger,
{
    ledger: Arc<L>,
}

impl<L> Clone for MappingViewBuilder<L>
where
    L: MappingLedger,
{
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<L> MappingViewBuilder<L>
where
    L: MappingLedger,
{
    /// Creates a view builder over a mapping ledger.
    #[must_use]
    pub const fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Builds the current view for `migration`.
    ///
    /// Falls back to the destination backend's static priority names when the
    /// destination has no dynamic vocabulary or returns an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationServiceError::MissingDestinationScope`] when the
    /// migration has no destination workspace,
    /// [`MigrationServiceError::DestinationUnavailable`] when a live
    /// destination lookup fails, or ledger persistence errors.
    pub async fn build(
        &self,
        migration: &Migration,
        destination: &dyn IntegrationProvider,
    ) -> MigrationServiceResult<MappingsState> {
        let route = migration.route();
        if route.destination_workspace_id().is_empty() {
            return Err(MigrationServiceError::MissingDestinationScope);
        }

        let records = self.ledger.list_for_migration(migration.id()).await?;
        let destination_members = destination
            .list_members(route.destination_workspace_id())
            .await
            .map_err(MigrationServiceError::DestinationUnavailable)?;
        let destination_statuses = destination
            .list_statuses(route.destination_list_id())
            .await
            .map_err(MigrationServiceError::DestinationUnavailable)?;
        let destination_priorities = match destination
            .priority_vocabulary(route.destination_list_id())
            .await
            .map_err(MigrationServiceError::DestinationUnavailable)?
        {
            Some(vocabulary) if !vocabulary.is_empty() => vocabulary.names(),
            _ => default_priorities(route.destination()),
        };

        let (mut statuses, mut priorities, mut assignees) = (Vec::new(), Vec::new(), Vec::new());
        for record in records {
            match record.kind() {
                MappingKind::Status => statuses.push(record),
                MappingKind::Priority => priorities.push(record),
                MappingKind::Assignee => assignees.push(record),
            }
        }

        let suggested_assignees = suggest_assignees(&assignees, &destination_members);
        tracing::debug!(
            migration_id = %migration.id(),
            suggestions = suggested_assignees.len(),
            "matched assignees by email"
        );

        Ok(MappingsState {
            migration: migration.clone(),
            statuses,
            priorities,
            assignees,
            destination_members,
            destination_statuses,
            destination_priorities,
            suggested_assignees,
        })
    }
}

/// Pairs pending assignee records with the first destination member sharing
/// their email. Emails compare trimmed and case-insensitively; blank emails
/// never match.
fn suggest_assignees(records: &[MappingRecord], members: &[Member]) -> BTreeMap<String, String> {
    let mut by_email: HashMap<String, &str> = HashMap::new();
    for member in members {
        if let Some(email) = normalized_email(&member.email) {
            by_email.entry(email).or_insert(member.id.as_str());
        }
    }

    records
        .iter()
        .filter(|record| record.is_pending())
        .filter_map(|record| {
            let email = normalized_email(&record.metadata()?.email)?;
            let member_id = by_email.get(&email)?;
            Some((record.source_value().to_owned(), (*member_id).to_owned()))
        })
        .collect()
}

fn normalized_email(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}
