//! Application services for migration orchestration.
//!
//! [`MigrationService`] is the entry point. It composes discovery, the
//! mapping view, the execution engine, and the execution tracker over the
//! migration ports.

mod discovery;
mod error;
mod execution;
mod lifecycle;
mod registry;
mod tracker;
mod view;

pub use discovery::{DiscoveredTasks, MappingDiscovery};
pub use error::{MigrationServiceError, MigrationServiceResult};
pub use execution::{ExecutionEngine, ExecutionReport};
#[cfg(test)]
pub(crate) use execution::Translation;
pub use lifecycle::{CreateMigrationRequest, MigrationService};
pub use registry::ProviderRegistry;
pub use tracker::ExecutionTracker;
pub use view::{MappingViewBuilder, MappingsState};
