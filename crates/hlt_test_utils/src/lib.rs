//! # HLT Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Snapshot builders and sample host constants
//! - Determinism test harness for the turn planner
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
