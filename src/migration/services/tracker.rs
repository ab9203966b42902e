//! Registry of in-flight execution tasks keyed by migration.

use crate::migration::domain::MigrationId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::{JoinError, JoinHandle};

/// Holds the join handle of every execution launched by the service.
///
/// Handles stay registered until joined, aborted, or replaced by a later
/// pass of the same migration.
#[derive(Debug, Clone, Default)]
pub struct ExecutionTracker {
    handles: Arc<Mutex<HashMap<MigrationId, JoinHandle<()>>>>,
}

impl ExecutionTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MigrationId, JoinHandle<()>>> {
        self.handles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns whether an execution for `migration_id` is still running.
    #[must_use]
    pub fn is_running(&self, migration_id: MigrationId) -> bool {
        self.lock()
            .get(&migration_id)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Registers the handle of a freshly launched execution.
    ///
    /// Returns `false` and leaves the tracker untouched when a live execution
    /// is already registered for the migration; finished handles are
    /// replaced.
    #[must_use]
    pub fn register(&self, migration_id: MigrationId, handle: JoinHandle<()>) -> bool {
        let mut handles = self.lock();
        if handles
            .get(&migration_id)
            .is_some_and(|existing| !existing.is_finished())
        {
            return false;
        }
        handles.insert(migration_id, handle);
        true
    }

    /// Waits for the execution of `migration_id`, if one is registered.
    ///
    /// # Errors
    ///
    /// Returns the runtime's [`JoinError`] when the execution panicked.
    /// Cancellation through [`Self::abort`] is not reported as an error.
    pub async fn join(&self, migration_id: MigrationId) -> Result<(), JoinError> {
        let handle = self.lock().remove(&migration_id);
        match handle {
            Some(running) => match running.await {
                Err(err) if err.is_cancelled() => Ok(()),
                other => other,
            },
            None => Ok(()),
        }
    }

    /// Cancels the execution of `migration_id` and waits for it to stop.
    ///
    /// Returns whether a live execution was cancelled.
    pub async fn abort(&self, migration_id: MigrationId) -> bool {
        let handle = self.lock().remove(&migration_id);
        let Some(running) = handle else {
            return false;
        };
        let was_live = !running.is_finished();
        running.abort();
        match running.await {
            Err(err) if !err.is_cancelled() => {
                tracing::warn!(
                    migration_id = %migration_id,
                    error = %err,
                    "aborted execution had panicked"
                );
            }
            _ => {}
        }
        was_live
    }
}
