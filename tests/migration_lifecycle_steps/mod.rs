//! Step definitions for migration lifecycle BDD scenarios.

pub mod then;
pub mod when;
pub mod world;
