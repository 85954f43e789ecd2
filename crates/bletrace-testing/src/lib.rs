//! Testing infrastructure for bletrace integration tests.
//!
//! This crate provides utilities for writing robust integration tests:
//! - `MemorySink`: Recording in-memory sink with an ordered op log
//! - `fixtures`: Deterministic sighting and timestamp builders

pub mod fixtures;
pub mod sink;

pub use sink::MemorySink;
