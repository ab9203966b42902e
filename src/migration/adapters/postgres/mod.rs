//! `PostgreSQL` adapters for migration persistence.
//!
//! Schema lives in `migrations/2026-03-02-000000_create_migration_tables`.
//! All Diesel work runs on the blocking thread pool through a shared r2d2
//! connection pool.

mod blocking;
mod mapping_ledger;
mod models;
mod outcome_ledger;
mod repository;
mod schema;

pub use blocking::MigrationPgPool;
pub use mapping_ledger::PostgresMappingLedger;
pub use outcome_ledger::PostgresOutcomeLedger;
pub use repository::PostgresMigrationRepository;
