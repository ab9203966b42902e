//! Unit tests for the migration context.
