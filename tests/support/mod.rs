//! Shared helpers for strata integration tests.

pub mod fixtures;
pub mod harness;
