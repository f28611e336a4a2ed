//! `strata graph`: print the dependency graph.

use anyhow::Result;
use clap::ValueEnum;
use serde_json::json;

use strata::graph::render;

use super::ui::{Output, OutputMode};
use super::{build_graph, GraphArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// One edge per line
    Text,
    /// Graphviz DOT
    Dot,
}

pub fn cmd_graph(
    args: &GraphArgs,
    format: GraphFormat,
    containment: bool,
    output: &Output,
) -> Result<()> {
    let config = args.load_config()?;
    let graph = build_graph(&config)?;

    if output.mode() == OutputMode::Json {
        let edges: Vec<_> = graph
            .all_edges()
            .into_iter()
            .filter(|(_, kind)| containment || *kind == strata::graph::EdgeKind::Import)
            .map(|(edge, kind)| {
                json!({
                    "importer": edge.importer,
                    "imported": edge.imported,
                    "kind": kind,
                })
            })
            .collect();
        let external: Vec<_> = graph
            .all_modules()
            .iter()
            .filter(|m| graph.is_external(m))
            .collect();
        output.json(&json!({
            "nodes": graph.all_modules(),
            "external": external,
            "edges": edges,
        }));
        return Ok(());
    }

    let rendered = match format {
        GraphFormat::Text => render::to_text(&graph, containment),
        GraphFormat::Dot => render::to_dot(&graph, containment),
    };
    output.block(&rendered);
    Ok(())
}
