//! In-memory adapter implementations for migration ports.
//!
//! These adapters keep all state behind shared locks and are suitable for
//! unit tests and local runs without a database or network access.

mod ledger;
mod provider;
mod repository;

pub use ledger::{InMemoryMappingLedger, InMemoryOutcomeLedger};
pub use provider::{CreatedTaskCall, InMemoryIntegrationProvider};
pub use repository::InMemoryMigrationRepository;
