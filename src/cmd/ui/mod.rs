//! Terminal output for the strata CLI.

pub mod output;

pub use output::{Output, OutputMode};
