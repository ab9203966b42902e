//! In-memory repository for migration aggregates.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::migration::{
    domain::{Migration, MigrationId, MigrationStatus},
    ports::{MigrationRepository, MigrationRepositoryError, MigrationRepositoryResult},
};

/// Thread-safe in-memory migration repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMigrationRepository {
    state: Arc<RwLock<HashMap<MigrationId, Migration>>>,
}

impl InMemoryMigrationRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> MigrationRepositoryError {
    MigrationRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl MigrationRepository for InMemoryMigrationRepository {
    async fn store(&self, migration: &Migration) -> MigrationRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.contains_key(&migration.id()) {
            return Err(MigrationRepositoryError::DuplicateMigration(migration.id()));
        }
        state.insert(migration.id(), migration.clone());
        Ok(())
    }

    async fn update_guarded(
        &self,
        migration: &Migration,
        expected: MigrationStatus,
    ) -> MigrationRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .get_mut(&migration.id())
            .ok_or(MigrationRepositoryError::NotFound(migration.id()))?;
        if stored.status() != expected {
            return Err(MigrationRepositoryError::StatusConflict {
                id: migration.id(),
                expected,
                actual: stored.status(),
            });
        }
        *stored = migration.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: MigrationId) -> MigrationRepositoryResult<Option<Migration>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.get(&id).cloned())
    }

    async fn list_all(&self) -> MigrationRepositoryResult<Vec<Migration>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut migrations: Vec<Migration> = state.values().cloned().collect();
        migrations.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(migrations)
    }
}
