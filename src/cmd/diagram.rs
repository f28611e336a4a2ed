//! `strata diagram`: check a PlantUML component diagram against the code.

use anyhow::{Context, Result};
use std::path::Path;

use strata::diagram::DiagramRule;
use strata::graph::DependencyGraph;
use strata::report::CheckReport;
use strata::source::DependencySource;

use super::ui::{Output, OutputMode};
use super::{build_graph, GraphArgs};

pub struct DiagramArgs<'a> {
    pub puml: &'a Path,
    pub manifest: Option<&'a Path>,
    pub base_module: Option<&'a str>,
    pub should_only: bool,
}

/// Returns the process exit code, as `check` does.
pub fn cmd_diagram(args: &DiagramArgs<'_>, graph_args: &GraphArgs, output: &Output) -> Result<i32> {
    let mut diagram = DiagramRule::from_file(args.puml)
        .with_context(|| format!("Failed to load diagram {}", args.puml.display()))?;
    if let Some(base) = args.base_module {
        diagram = diagram.base_module(base)?;
    }
    if args.should_only {
        diagram = diagram.should_only();
    }

    // An explicit manifest needs no config file.
    let (project, graph) = match args.manifest {
        Some(manifest) => {
            let source = DependencySource::load(manifest)?;
            let graph = DependencyGraph::build(&source, graph_args.graph_options()?)?;
            (manifest.display().to_string(), graph)
        }
        None => {
            let config = graph_args.load_config()?;
            (config.project.name.clone(), build_graph(&config)?)
        }
    };
    output.step(&format!("Checking {}", diagram));

    let mut report = CheckReport::new(project, &graph);
    report.record_diagram(&diagram, &graph);

    match output.mode() {
        OutputMode::Json => output.json(&serde_json::to_value(&report)?),
        OutputMode::Human => output.block(&report.render_text(output.colors())),
        OutputMode::Quiet => {
            if !report.is_success() {
                output.error(&report.summary());
            }
        }
    }
    Ok(report.exit_code())
}
