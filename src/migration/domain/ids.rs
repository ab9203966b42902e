//! Identifier and validated scalar types for the migration domain.

use super::MigrationDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length for a backend name, matching the `VARCHAR(100)` column.
const MAX_BACKEND_NAME_LENGTH: usize = 100;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for one migration attempt.
    MigrationId
);

uuid_id!(
    /// Unique identifier for a mapping ledger record.
    MappingId
);

uuid_id!(
    /// Unique identifier for a task outcome ledger entry.
    OutcomeId
);

/// Validated name of a work-tracking backend (e.g. `asana`, `clickup`).
///
/// Backend names key the provider registry, so they are normalized to
/// lowercase and restricted to `[a-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendName(String);

impl BackendName {
    /// Creates a validated backend name.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::EmptyBackendName`] when the value is
    /// empty after trimming, [`MigrationDomainError::BackendNameTooLong`]
    /// when it exceeds 100 characters, or
    /// [`MigrationDomainError::InvalidBackendName`] when it contains
    /// characters outside `[a-z0-9_]`.
    pub fn new(value: impl Into<String>) -> Result<Self, MigrationDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(MigrationDomainError::EmptyBackendName);
        }

        if normalized.len() > MAX_BACKEND_NAME_LENGTH {
            return Err(MigrationDomainError::BackendNameTooLong(raw));
        }

        let is_valid = normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !is_valid {
            return Err(MigrationDomainError::InvalidBackendName(raw));
        }

        Ok(Self(normalized))
    }

    /// Returns the backend name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BackendName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BackendName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
