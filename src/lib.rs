//! # Strata - architecture rules for module dependency graphs
//!
//! Strata checks a codebase's import structure against declared architectural
//! rules: which modules may, must, or must not depend on which others, and
//! how named layers may access each other.
//!
//! ## Overview
//!
//! An adapter (a YAML/JSON manifest, or a PlantUML component diagram) yields a
//! [`source::DependencySource`]. It is turned once into a read-only
//! [`graph::DependencyGraph`], optionally focused on a subtree or aggregated to
//! a level limit. Rules are built with a staged builder and evaluated against
//! the graph; a broken rule reports every offending edge.
//!
//! ## Modules
//!
//! - [`module`] - Dotted module paths and their hierarchy
//! - [`source`] - Dependency sources and manifest loading
//! - [`graph`] - Graph construction, queries and rendering
//! - [`filter`] - Literal, exact and regex module filters
//! - [`layer`] - Layer registry and its state machine
//! - [`rule`] - Rule model, builder and evaluation
//! - [`diagram`] - PlantUML parsing and diagram rules
//! - [`config`] - Declarative configuration in `.strata/architecture.md`
//! - [`report`] - Aggregated check results
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```
//! use strata::graph::DependencyGraph;
//! use strata::layer::LayeredArchitecture;
//! use strata::rule::Rule;
//! use strata::source::DependencySource;
//!
//! let source = DependencySource::parse_yaml(
//!     "modules: [core, core.model, ui, ui.view]\n\
//!      imports: [{ importer: ui.view, imported: core.model }]",
//! )
//! .expect("valid manifest");
//! let graph = DependencyGraph::from_source(&source)?;
//!
//! let mut arch = LayeredArchitecture::new();
//! arch.layer("core")?.containing_modules(["core"])?;
//! arch.layer("ui")?.containing_modules(["ui"])?;
//! let layers = arch.mapping()?;
//!
//! let rule = Rule::layers_that(&layers)
//!     .are_named(["core"])?
//!     .should_not()
//!     .access_layers_that()
//!     .are_named(["ui"])?;
//! rule.assert_applies(&graph)?;
//! # Ok::<(), strata::error::CheckError>(())
//! ```

pub mod config;
pub mod diagram;
pub mod error;
pub mod filter;
pub mod graph;
pub mod layer;
pub mod module;
pub mod report;
pub mod rule;
pub mod source;

pub use error::{CheckError, ConfigurationError};
pub use rule::assert_applies;

/// Default path constants for the strata directory structure.
pub mod paths {
    /// Directory holding strata files: `.strata`
    pub const STRATA_DIR: &str = ".strata";
    /// Architecture configuration: `.strata/architecture.md`
    pub const CONFIG_FILE: &str = ".strata/architecture.md";
}

/// Generate a UTC timestamp in ISO 8601 format: `YYYY-MM-DDTHH:MM:SSZ`
pub fn utc_now_iso() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
