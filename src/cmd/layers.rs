//! `strata layers`: show which modules each layer resolves to.

use anyhow::Result;
use serde_json::json;

use super::ui::{Output, OutputMode};
use super::{build_graph, GraphArgs};

pub fn cmd_layers(args: &GraphArgs, output: &Output) -> Result<()> {
    let config = args.load_config()?;
    let graph = build_graph(&config)?;
    let architecture = config.architecture()?;
    let mapping = architecture.mapping()?;

    if mapping.names().next().is_none() {
        output.warn("No layers configured");
        return Ok(());
    }
    mapping.check_disjoint(&graph)?;
    output.success(&format!(
        "{} layers, no module claimed twice",
        mapping.names().count()
    ));

    let mut layers = Vec::new();
    for name in mapping.names() {
        let modules = mapping.expand(name, &graph)?;
        match output.mode() {
            OutputMode::Json => layers.push(json!({ "layer": name, "modules": modules })),
            _ => {
                output.info(&format!("{} ({} modules)", name, modules.len()));
                for module in &modules {
                    output.detail(module.as_str());
                }
            }
        }
    }

    let unassigned: Vec<_> = graph
        .internal_modules()
        .filter(|module| mapping.layer_of(module).is_none())
        .collect();

    match output.mode() {
        OutputMode::Json => output.json(&json!({
            "layers": layers,
            "unassigned": unassigned,
        })),
        _ => {
            if !unassigned.is_empty() {
                output.info(&format!("unassigned ({} modules)", unassigned.len()));
                for module in unassigned {
                    output.detail(module.as_str());
                }
            }
        }
    }
    Ok(())
}
