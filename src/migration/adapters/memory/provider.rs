//! In-memory integration provider for migration tests and local runs.

use crate::migration::{
    domain::{CreatedTask, Member, PriorityVocabulary, SourceTask},
    ports::{IntegrationError, IntegrationProvider, IntegrationResult},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Scriptable in-memory backend.
///
/// This adapter models a work-tracking backend without network access. Tasks,
/// members, statuses, and priority vocabularies are seeded per container, and
/// individual operations can be switched to fail.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIntegrationProvider {
    state: Arc<RwLock<InMemoryProviderState>>,
}

#[derive(Debug, Default)]
struct InMemoryProviderState {
    tasks: HashMap<String, Vec<SourceTask>>,
    members: HashMap<String, Vec<Member>>,
    statuses: HashMap<String, Vec<String>>,
    vocabularies: HashMap<String, PriorityVocabulary>,
    rejected_task_names: HashSet<String>,
    fetch_unavailable: bool,
    members_unavailable: bool,
    vocabulary_unavailable: bool,
    create_delay: Option<Duration>,
    created: Vec<CreatedTaskCall>,
    next_task_number: u64,
}

/// One recorded `create_task` call.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedTaskCall {
    /// Destination container the task was created in.
    pub container_id: String,
    /// Destination workspace passed alongside the container.
    pub workspace_id: String,
    /// Translated task as received.
    pub task: SourceTask,
    /// Identifier the adapter assigned.
    pub created_id: String,
}

fn lock_error(err: impl std::fmt::Display) -> IntegrationError {
    IntegrationError::unavailable(std::io::Error::other(err.to_string()))
}

impl InMemoryIntegrationProvider {
    /// Creates an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut InMemoryProviderState) -> T,
    ) -> IntegrationResult<T> {
        let mut state = self.state.write().map_err(lock_error)?;
        Ok(f(&mut state))
    }

    /// Replaces the tasks held in a container.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Unavailable`] when lock acquisition fails.
    pub fn seed_tasks(
        &self,
        container_id: impl Into<String>,
        tasks: impl IntoIterator<Item = SourceTask>,
    ) -> IntegrationResult<()> {
        let container = container_id.into();
        let seeded: Vec<SourceTask> = tasks.into_iter().collect();
        self.with_state(|state| {
            state.tasks.insert(container, seeded);
        })
    }

    /// Appends one task to a container.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Unavailable`] when lock acquisition fails.
    pub fn push_task(
        &self,
        container_id: impl Into<String>,
        task: SourceTask,
    ) -> IntegrationResult<()> {
        let container = container_id.into();
        self.with_state(|state| state.tasks.entry(container).or_default().push(task))
    }

    /// Replaces the members of a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Unavailable`] when lock acquisition fails.
    pub fn seed_members(
        &self,
        workspace_id: impl Into<String>,
        members: impl IntoIterator<Item = Member>,
    ) -> IntegrationResult<()> {
        let workspace = workspace_id.into();
        let seeded: Vec<Member> = members.into_iter().collect();
        self.with_state(|state| {
            state.members.insert(workspace, seeded);
        })
    }

    /// Replaces the status labels of a container.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Unavailable`] when lock acquisition fails.
    pub fn seed_statuses(
        &self,
        container_id: impl Into<String>,
        statuses: impl IntoIterator<Item = String>,
    ) -> IntegrationResult<()> {
        let container = container_id.into();
        let seeded: Vec<String> = statuses.into_iter().collect();
        self.with_state(|state| {
            state.statuses.insert(container, seeded);
        })
    }

    /// Enables dynamic priority lookup for a container.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Unavailable`] when lock acquisition fails.
    pub fn seed_priority_vocabulary(
        &self,
        container_id: impl Into<String>,
        vocabulary: PriorityVocabulary,
    ) -> IntegrationResult<()> {
        let container = container_id.into();
        self.with_state(|state| {
            state.vocabularies.insert(container, vocabulary);
        })
    }

    /// Makes task creation fail for tasks with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Unavailable`] when lock acquisition fails.
    pub fn reject_task_named(&self, name: impl Into<String>) -> IntegrationResult<()> {
        let task_name = name.into();
        self.with_state(|state| {
            state.rejected_task_names.insert(task_name);
        })
    }

    /// Toggles failure of `fetch_tasks`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Unavailable`] when lock acquisition fails.
    pub fn set_fetch_unavailable(&self, unavailable: bool) -> IntegrationResult<()> {
        self.with_state(|state| state.fetch_unavailable = unavailable)
    }

    /// Toggles failure of `list_members`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Unavailable`] when lock acquisition fails.
    pub fn set_members_unavailable(&self, unavailable: bool) -> IntegrationResult<()> {
        self.with_state(|state| state.members_unavailable = unavailable)
    }

    /// Toggles failure of `priority_vocabulary`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Unavailable`] when lock acquisition fails.
    pub fn set_vocabulary_unavailable(&self, unavailable: bool) -> IntegrationResult<()> {
        self.with_state(|state| state.vocabulary_unavailable = unavailable)
    }

    /// Delays every `create_task` call, keeping executions in flight.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Unavailable`] when lock acquisition fails.
    pub fn set_create_delay(&self, delay: Duration) -> IntegrationResult<()> {
        self.with_state(|state| state.create_delay = Some(delay))
    }

    /// Returns every successful `create_task` call in call order.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationError::Unavailable`] when lock acquisition fails.
    pub fn created_tasks(&self) -> IntegrationResult<Vec<CreatedTaskCall>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.created.clone())
    }
}

fn unavailable(operation: &str) -> IntegrationError {
    IntegrationError::unavailable(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        format!("{operation} is unavailable"),
    ))
}

#[async_trait]
impl IntegrationProvider for InMemoryIntegrationProvider {
    async fn fetch_tasks(&self, container_id: &str) -> IntegrationResult<Vec<SourceTask>> {
        let state = self.state.read().map_err(lock_error)?;
        if state.fetch_unavailable {
            return Err(unavailable("fetch_tasks"));
        }
        Ok(state.tasks.get(container_id).cloned().unwrap_or_default())
    }

    async fn create_task(
        &self,
        container_id: &str,
        workspace_id: &str,
        task: &SourceTask,
    ) -> IntegrationResult<CreatedTask> {
        let delay = self.state.read().map_err(lock_error)?.create_delay;
        if let Some(pause) = delay {
            tokio::time::sleep(pause).await;
        }

        let mut state = self.state.write().map_err(lock_error)?;
        if state.rejected_task_names.contains(&task.name) {
            return Err(IntegrationError::rejected(format!(
                "task '{}' was refused by the destination",
                task.name
            )));
        }

        state.next_task_number += 1;
        let created_id = format!("dest-{}", state.next_task_number);
        state.created.push(CreatedTaskCall {
            container_id: container_id.to_owned(),
            workspace_id: workspace_id.to_owned(),
            task: task.clone(),
            created_id: created_id.clone(),
        });
        Ok(CreatedTask {
            id: created_id,
            name: task.name.clone(),
        })
    }

    async fn list_members(&self, workspace_id: &str) -> IntegrationResult<Vec<Member>> {
        let state = self.state.read().map_err(lock_error)?;
        if state.members_unavailable {
            return Err(unavailable("list_members"));
        }
        Ok(state.members.get(workspace_id).cloned().unwrap_or_default())
    }

    async fn list_statuses(&self, container_id: &str) -> IntegrationResult<Vec<String>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.statuses.get(container_id).cloned().unwrap_or_default())
    }

    async fn priority_vocabulary(
        &self,
        container_id: &str,
    ) -> IntegrationResult<Option<PriorityVocabulary>> {
        let state = self.state.read().map_err(lock_error)?;
        if state.vocabulary_unavailable {
            return Err(unavailable("priority_vocabulary"));
        }
        Ok(state.vocabularies.get(container_id).cloned())
    }
}
