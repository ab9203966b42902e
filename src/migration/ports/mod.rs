//! Port contracts for task migrations.
//!
//! Ports define infrastructure-agnostic interfaces used by migration
//! services: persistence of the migration aggregate and its two ledgers, and
//! the per-backend integration capability set.

pub mod ledger;
pub mod provider;
pub mod repository;

pub use ledger::{
    MappingLedger, MappingLedgerError, MappingLedgerResult, TaskOutcomeLedger,
    TaskOutcomeLedgerError, TaskOutcomeLedgerResult,
};
pub use provider::{IntegrationError, IntegrationProvider, IntegrationResult};
pub use repository::{MigrationRepository, MigrationRepositoryError, MigrationRepositoryResult};
