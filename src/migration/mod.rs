//! Task migration between work-tracking backends.
//!
//! A migration discovers the distinct status, priority, and assignee values
//! of a source container, waits until an operator has resolved every one of
//! them to a destination value, and then replays each source task against the
//! destination in the background while isolating per-task failures. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
