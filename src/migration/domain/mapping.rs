//! Mapping ledger records translating discovered source values.

use super::{
    MappingId, MigrationDomainError, MigrationId, ParseMappingKindError, ParseMappingStatusError,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute class requiring translation between backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    /// Task status values.
    Status,
    /// Task priority values.
    Priority,
    /// Assignee identifiers.
    Assignee,
}

impl MappingKind {
    /// All mapping kinds in presentation order.
    pub const ALL: [Self; 3] = [Self::Status, Self::Priority, Self::Assignee];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Priority => "priority",
            Self::Assignee => "assignee",
        }
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MappingKind {
    type Error = ParseMappingKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            "assignee" => Ok(Self::Assignee),
            _ => Err(ParseMappingKindError(value.to_owned())),
        }
    }
}

/// Resolution state of a mapping record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingStatus {
    /// Awaiting an operator-supplied destination value.
    Pending,
    /// A destination value has been supplied.
    Mapped,
}

impl MappingStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Mapped => "mapped",
        }
    }
}

impl fmt::Display for MappingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MappingStatus {
    type Error = ParseMappingStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "mapped" => Ok(Self::Mapped),
            _ => Err(ParseMappingStatusError(value.to_owned())),
        }
    }
}

/// Display details captured for an assignee at discovery time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssigneeMetadata {
    /// Display name as reported by the source backend.
    pub name: String,
    /// Email address as reported by the source backend.
    pub email: String,
}

/// One discovered source value and its translation, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    id: MappingId,
    migration_id: MigrationId,
    kind: MappingKind,
    source_value: String,
    destination_value: Option<String>,
    status: MappingStatus,
    metadata: Option<AssigneeMetadata>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted mapping record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMappingData {
    /// Persisted record identifier.
    pub id: MappingId,
    /// Owning migration.
    pub migration_id: MigrationId,
    /// Attribute class.
    pub kind: MappingKind,
    /// Discovered source value.
    pub source_value: String,
    /// Resolved destination value, if any.
    pub destination_value: Option<String>,
    /// Resolution state.
    pub status: MappingStatus,
    /// Assignee display details, if any.
    pub metadata: Option<AssigneeMetadata>,
    /// Discovery timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest resolution timestamp.
    pub updated_at: DateTime<Utc>,
}

impl MappingRecord {
    /// Creates a pending record for a newly observed source value.
    #[must_use]
    pub fn pending(
        migration_id: MigrationId,
        kind: MappingKind,
        source_value: impl Into<String>,
        metadata: Option<AssigneeMetadata>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: MappingId::new(),
            migration_id,
            kind,
            source_value: source_value.into(),
            destination_value: None,
            status: MappingStatus::Pending,
            metadata,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedMappingData) -> Self {
        Self {
            id: data.id,
            migration_id: data.migration_id,
            kind: data.kind,
            source_value: data.source_value,
            destination_value: data.destination_value,
            status: data.status,
            metadata: data.metadata,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> MappingId {
        self.id
    }

    /// Returns the owning migration.
    #[must_use]
    pub const fn migration_id(&self) -> MigrationId {
        self.migration_id
    }

    /// Returns the attribute class.
    #[must_use]
    pub const fn kind(&self) -> MappingKind {
        self.kind
    }

    /// Returns the discovered source value.
    #[must_use]
    pub fn source_value(&self) -> &str {
        &self.source_value
    }

    /// Returns the resolved destination value, if any.
    #[must_use]
    pub fn destination_value(&self) -> Option<&str> {
        self.destination_value.as_deref()
    }

    /// Returns the resolution state.
    #[must_use]
    pub const fn status(&self) -> MappingStatus {
        self.status
    }

    /// Returns whether the record still awaits resolution.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.status, MappingStatus::Pending)
    }

    /// Returns assignee display details, if any.
    #[must_use]
    pub const fn metadata(&self) -> Option<&AssigneeMetadata> {
        self.metadata.as_ref()
    }

    /// Returns the discovery timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest resolution timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether this record is the target of `resolution`.
    #[must_use]
    pub fn matches(&self, resolution: &Resolution) -> bool {
        self.kind == resolution.kind && self.source_value == resolution.source_value
    }

    /// Records an operator-supplied destination value.
    ///
    /// A mapped record may be re-resolved; the latest value wins.
    pub fn resolve(&mut self, destination_value: impl Into<String>, resolved_at: DateTime<Utc>) {
        self.destination_value = Some(destination_value.into());
        self.status = MappingStatus::Mapped;
        self.updated_at = resolved_at;
    }
}

/// Operator-supplied destination value for a discovered source value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    kind: MappingKind,
    source_value: String,
    destination_value: String,
}

impl Resolution {
    /// Creates a validated resolution.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::EmptyResolution`] when the destination
    /// value is blank.
    pub fn new(
        kind: MappingKind,
        source_value: impl Into<String>,
        destination_value: impl Into<String>,
    ) -> Result<Self, MigrationDomainError> {
        let source = source_value.into();
        let destination = destination_value.into().trim().to_owned();
        if destination.is_empty() {
            return Err(MigrationDomainError::EmptyResolution {
                kind: kind.as_str().to_owned(),
                source_value: source,
            });
        }
        Ok(Self {
            kind,
            source_value: source,
            destination_value: destination,
        })
    }

    /// Returns the targeted attribute class.
    #[must_use]
    pub const fn kind(&self) -> MappingKind {
        self.kind
    }

    /// Returns the targeted source value.
    #[must_use]
    pub fn source_value(&self) -> &str {
        &self.source_value
    }

    /// Returns the destination value to record.
    #[must_use]
    pub fn destination_value(&self) -> &str {
        &self.destination_value
    }
}
