//! Task, member, and vocabulary shapes exchanged with integration providers.

use super::BackendName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Destination status used when a task's source status has no mapping.
pub const DEFAULT_DESTINATION_STATUS: &str = "to do";

/// A person assigned to a task on either backend.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskAssignee {
    /// Backend-specific user identifier.
    pub id: String,
    /// Display name, empty when unknown.
    pub name: String,
    /// Email address, empty when unknown.
    pub email: String,
}

impl TaskAssignee {
    /// Creates an assignee with the given identifier and no display details.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            email: String::new(),
        }
    }

    /// Sets display details.
    #[must_use]
    pub fn with_details(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.name = name.into();
        self.email = email.into();
        self
    }
}

/// Work item read from a source backend or sent to a destination backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceTask {
    /// Backend-specific task identifier.
    pub id: String,
    /// Task title.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Status label, empty when unset.
    pub status: String,
    /// Whether the task is marked complete.
    pub completed: bool,
    /// Assigned people.
    pub assignees: Vec<TaskAssignee>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Priority label or destination option reference, empty when unset.
    pub priority: String,
    /// Opaque pass-through fields not interpreted by the orchestrator.
    pub custom_fields: BTreeMap<String, Value>,
}

impl SourceTask {
    /// Creates a task with the given identifier and title.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the status label.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the priority label.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Sets the assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = TaskAssignee>) -> Self {
        self.assignees = assignees.into_iter().collect();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Task as acknowledged by the destination after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTask {
    /// Destination task identifier.
    pub id: String,
    /// Destination task title.
    pub name: String,
}

/// Workspace member on a destination backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Backend-specific user identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Destination priority field and its named options.
///
/// Backends such as Asana model priority as an enum custom field, so a task
/// priority is addressed by the field identifier plus one option identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriorityVocabulary {
    /// Identifier of the priority field, when the backend reports one.
    pub field_id: Option<String>,
    /// Option display name to option identifier.
    pub options: BTreeMap<String, String>,
}

impl PriorityVocabulary {
    /// Creates a vocabulary for the given field.
    #[must_use]
    pub fn new(field_id: impl Into<String>) -> Self {
        Self {
            field_id: Some(field_id.into()),
            options: BTreeMap::new(),
        }
    }

    /// Adds a named option.
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, option_id: impl Into<String>) -> Self {
        self.options.insert(name.into(), option_id.into());
        self
    }

    /// Returns whether no options are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Returns option names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.options.keys().cloned().collect()
    }

    /// Returns the compound `<field>:<option>` reference for a priority name.
    ///
    /// Returns `None` when either the field or the option is unknown.
    #[must_use]
    pub fn option_ref(&self, name: &str) -> Option<String> {
        let field_id = self.field_id.as_deref().filter(|id| !id.is_empty())?;
        let option_id = self.options.get(name).filter(|id| !id.is_empty())?;
        Some(format!("{field_id}:{option_id}"))
    }
}

/// Static priority names offered when a destination has no dynamic lookup.
#[must_use]
pub fn default_priorities(backend: &BackendName) -> Vec<String> {
    let names: &[&str] = match backend.as_str() {
        "clickup" => &["urgent", "high", "normal", "low"],
        "asana" => &["High", "Medium", "Low"],
        _ => &[],
    };
    names.iter().map(|name| (*name).to_owned()).collect()
}
