//! Taskferry: task migration orchestration between work-tracking backends.
//!
//! A migration copies every task of a source container (an Asana project,
//! say) into a destination container (a `ClickUp` list). Attribute values
//! that differ between the two systems are discovered up front and
//! translated through an operator-maintained mapping ledger. Execution is
//! gated on every discovered value being mapped, runs in the background,
//! and records one outcome per task so a single rejected task never stops
//! the pass.
//!
//! # Architecture
//!
//! Taskferry follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence and backends
//! - **Adapters**: In-memory and `PostgreSQL` implementations of the ports
//! - **Services**: Discovery, mapping view, lifecycle, and execution
//!
//! # Modules
//!
//! - [`migration`]: The migration bounded context
//! - [`config`]: TOML runtime configuration
//! - [`telemetry`]: Structured logging setup

pub mod config;
pub mod migration;
pub mod telemetry;
