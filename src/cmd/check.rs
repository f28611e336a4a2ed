//! `strata check`: evaluate every configured rule and diagram.

use anyhow::Result;

use strata::report::CheckReport;

use super::ui::{Output, OutputMode};
use super::{build_graph, GraphArgs};

/// Returns the process exit code: 0 clean, 1 violations, 2 misconfigured.
pub fn cmd_check(args: &GraphArgs, output: &Output) -> Result<i32> {
    let config = args.load_config()?;
    output.step(&format!(
        "Loading dependencies from {}",
        config.manifest_path().display()
    ));
    let graph = build_graph(&config)?;

    let mapping = config.architecture()?.mapping()?;
    let rules = config.rules(&mapping)?;
    let diagrams = config.diagrams()?;
    if rules.is_empty() && diagrams.is_empty() {
        output.warn("No rules or diagrams configured");
    }

    let mut report = CheckReport::new(&config.project.name, &graph);
    for named in &rules {
        report.record_rule(&named.name, &named.rule, &graph);
    }
    for diagram in &diagrams {
        report.record_diagram(diagram, &graph);
    }

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
