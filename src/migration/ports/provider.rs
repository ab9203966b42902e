//! Integration provider port for work-tracking backends.

use crate::migration::domain::{CreatedTask, Member, PriorityVocabulary, SourceTask};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for integration provider operations.
pub type IntegrationResult<T> = Result<T, IntegrationError>;

/// Capability set one backend exposes to the migration orchestrator.
///
/// Every method may suspend on network I/O.
#[async_trait]
pub trait IntegrationProvider: Send + Sync {
    /// Fetches every task in a container, in backend order.
    async fn fetch_tasks(&self, container_id: &str) -> IntegrationResult<Vec<SourceTask>>;

    /// Creates a task in a destination container.
    async fn create_task(
        &self,
        container_id: &str,
        workspace_id: &str,
        task: &SourceTask,
    ) -> IntegrationResult<CreatedTask>;

    /// Lists members of a workspace. `workspace_id` is never empty.
    async fn list_members(&self, workspace_id: &str) -> IntegrationResult<Vec<Member>>;

    /// Lists the status labels available in a container.
    async fn list_statuses(&self, container_id: &str) -> IntegrationResult<Vec<String>>;

    /// Resolves the priority field vocabulary of a container.
    ///
    /// Returns `Ok(None)` when the backend has no dynamic priority lookup.
    async fn priority_vocabulary(
        &self,
        _container_id: &str,
    ) -> IntegrationResult<Option<PriorityVocabulary>> {
        Ok(None)
    }
}

/// Errors returned by integration provider implementations.
#[derive(Debug, Clone, Error)]
pub enum IntegrationError {
    /// Transport failure or non-success backend response.
    #[error("backend unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// The backend refused the request.
    #[error("backend rejected request: {0}")]
    Rejected(String),
}

impl IntegrationError {
    /// Wraps a transport error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Creates a rejection with a backend-supplied message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}
