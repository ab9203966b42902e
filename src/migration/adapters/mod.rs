//! Adapter implementations for migration persistence and integration ports.
//!
//! - [`memory`]: thread-safe in-memory repository, ledgers, and a scriptable
//!   integration provider
//! - [`postgres`]: Diesel-backed persistence for the migration aggregate and
//!   both ledgers

pub mod memory;
pub mod postgres;
