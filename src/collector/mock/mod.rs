//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built scenarios for testing
//! collectors without requiring a kernel with bcache loaded.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
pub use scenarios::SCENARIO_ROOT;
