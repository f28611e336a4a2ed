//! Command handlers for the strata CLI.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use strata::config::ArchitectureConfig;
use strata::graph::{DependencyGraph, GraphOptions};
use strata::module::ModulePath;
use strata::paths::CONFIG_FILE;

pub mod check;
pub mod diagram;
pub mod graph;
pub mod layers;
pub mod ui;

/// Options shared by every command that builds a graph from the config.
#[derive(Debug, Clone, Default, Args)]
pub struct GraphArgs {
    /// Architecture config file [default: .strata/architecture.md]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Restrict the graph to imports made inside this module
    #[arg(long, value_name = "MODULE")]
    pub focus: Option<String>,
    /// Aggregate modules below this level into their ancestor
    #[arg(long, value_name = "N")]
    pub level: Option<usize>,
    /// Keep imports of modules outside the analyzed project
    #[arg(long)]
    pub include_external: bool,
}

impl GraphArgs {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
    }

    /// Load the config and apply command-line overrides to its graph section.
    pub fn load_config(&self) -> Result<ArchitectureConfig> {
        let path = self.config_path();
        if !path.exists() {
            anyhow::bail!(
                "No architecture config at {}. Create it or pass --config.",
                path.display()
            );
        }
        let mut config = ArchitectureConfig::load_from(&path)?;

        if let Some(focus) = &self.focus {
            config.graph.focus = Some(focus.clone());
        }
        if let Some(level) = self.level {
            config.graph.level_limit = Some(level);
        }
        if self.include_external {
            config.graph.include_external = true;
        }
        Ok(config)
    }

    /// Graph options from the flags alone, for commands run without a config.
    pub fn graph_options(&self) -> Result<GraphOptions> {
        let mut options = GraphOptions::new().include_external(self.include_external);
        if let Some(focus) = &self.focus {
            options = options.with_focus(ModulePath::parse(focus)?);
        }
        if let Some(level) = self.level {
            options = options.with_level_limit(level);
        }
        Ok(options)
    }
}

/// Load the manifest named by `config` and build its graph.
pub fn build_graph(config: &ArchitectureConfig) -> Result<DependencyGraph> {
    let source = config.load_source()?;
    let options = config.graph_options()?;
    DependencyGraph::build(&source, options).with_context(|| {
        format!(
            "Failed to build dependency graph from {}",
            config.manifest_path().display()
        )
    })
}
