//! End-to-end tests for the strata binary.

#[allow(dead_code)]
mod support;

use serde_json::Value;
use support::harness::{stdout, ProjectHarness};

const LAYERED_CONFIG: &str = r#"project:
  name: demo
  manifest: deps.yaml
layers:
  - name: core
    modules: [app.core]
  - name: ui
    modules: [app.ui]
rules:
  - name: core is independent of ui
    subject: { layers: [core] }
    behavior: should_not
    object: { layers: [ui] }
"#;

const BROKEN_RULE: &str = r#"  - name: ui is independent of core
    subject: { layers: [ui] }
    behavior: should_not
    object: { layers: [core] }
"#;

fn last_json_line(output: &std::process::Output) -> Value {
    let text = stdout(output);
    let line = text.lines().last().expect("strata printed nothing");
    serde_json::from_str(line).unwrap_or_else(|e| panic!("not JSON: {} ({})", line, e))
}

#[test]
fn test_check_passes() {
    let harness = ProjectHarness::new(LAYERED_CONFIG);
    let output = harness.run(&["check"]);

    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));
    assert!(stdout(&output).contains("✓ core is independent of ui"));
    assert!(stdout(&output).contains("1 passed, 0 failed, 0 misconfigured"));
}

#[test]
fn test_check_reports_violation() {
    let harness = ProjectHarness::new(&format!("{}{}", LAYERED_CONFIG, BROKEN_RULE));
    let output = harness.run(&["check"]);

    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains("✗ ui is independent of core"));
    assert!(text.contains("app.ui.view -> app.core.model (forbidden)"));
}

#[test]
fn test_check_json_output() {
    let harness = ProjectHarness::new(&format!("{}{}", LAYERED_CONFIG, BROKEN_RULE));
    let output = harness.run(&["check", "--json"]);

    assert_eq!(output.status.code(), Some(1));
    let report = last_json_line(&output);
    assert_eq!(report["project"], "demo");
    assert_eq!(report["results"][0]["status"], "passed");
    assert_eq!(report["results"][1]["status"], "failed");
    assert_eq!(
        report["results"][1]["violation"]["violations"][0]["imported"],
        "app.core.model"
    );
}

#[test]
fn test_overlapping_layers_exit_two() {
    let config = r#"project:
  name: demo
  manifest: deps.yaml
layers:
  - name: core
    modules: [app.core]
  - name: models
    pattern: ".*\\.model"
rules:
  - subject: { layers: [core] }
    behavior: should_not
    any: true
"#;
    let harness = ProjectHarness::new(config);
    let output = harness.run(&["check"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("belongs to both layer core and layer models"));
}

#[test]
fn test_missing_config_exit_two() {
    let harness = ProjectHarness::new(LAYERED_CONFIG);
    let output = harness.run(&["check", "--config", "nowhere.md"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("No architecture config at nowhere.md"));
}

#[test]
fn test_invalid_config_exit_two() {
    let config = r#"project:
  name: demo
rules:
  - subject: { modules: [app.ui] }
    behavior: should_not
"#;
    let harness = ProjectHarness::new(config);
    let output = harness.run(&["check"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("needs exactly one of"));
}

#[test]
fn test_graph_dot_output() {
    let harness = ProjectHarness::new(LAYERED_CONFIG);
    let output = harness.run(&["graph", "--format", "dot"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("digraph dependencies {"));
    assert!(text.contains("\"app.ui.view\" -> \"app.core.model\";"));
}

#[test]
fn test_graph_level_override() {
    let harness = ProjectHarness::new(LAYERED_CONFIG);
    let output = harness.run(&["graph", "--level", "1"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("app.ui -> app.core"));
    assert!(!text.contains("app.ui.view"));
}

#[test]
fn test_layers_json_lists_unassigned() {
    let harness = ProjectHarness::new(LAYERED_CONFIG);
    let output = harness.run(&["layers", "--json"]);

    assert!(output.status.success());
    let layers = last_json_line(&output);
    assert_eq!(layers["layers"][0]["layer"], "core");
    assert_eq!(layers["layers"][0]["modules"][1], "app.core.model");
    let unassigned: Vec<&str> = layers["unassigned"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(unassigned, vec!["app", "app.util"]);
}

#[test]
fn test_diagram_command() {
    let harness = ProjectHarness::new(LAYERED_CONFIG);
    harness.write(
        "docs/ok.puml",
        "@startuml\n[ui] --> [core]\n[ui] --> [util]\n[core] --> [util]\n@enduml\n",
    );
    harness.write(
        "docs/strict.puml",
        "@startuml\n[ui] --> [core]\n[core] --> [util]\n@enduml\n",
    );

    let ok = harness.run(&["diagram", "docs/ok.puml", "--base-module", "app"]);
    assert_eq!(ok.status.code(), Some(0), "{}", stdout(&ok));

    let strict = harness.run(&[
        "diagram",
        "docs/strict.puml",
        "--base-module",
        "app",
        "--manifest",
        "deps.yaml",
    ]);
    assert_eq!(strict.status.code(), Some(1));
    assert!(stdout(&strict).contains("app.ui.view -> app.util"));
}

#[test]
fn test_diagram_without_tags_exit_two() {
    let harness = ProjectHarness::new(LAYERED_CONFIG);
    harness.write("broken.puml", "[ui] --> [core]\n");

    let output = harness.run(&["diagram", "broken.puml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("PUML file needs a start and an end tag."));
}

#[test]
fn test_configured_diagram_checked() {
    let config = format!(
        "{}diagrams:\n  - path: docs/components.puml\n    base_module: app\n",
        LAYERED_CONFIG
    );
    let harness = ProjectHarness::new(&config);
    harness.write(
        "docs/components.puml",
        "@startuml\n[ui] --> [core]\n[ui] --> [util]\n[core] --> [util]\n@enduml\n",
    );

    let output = harness.run(&["check"]);
    assert_eq!(output.status.code(), Some(0), "{}", stdout(&output));
    assert!(stdout(&output).contains("diagram"));
}

#[test]
fn test_completions() {
    let harness = ProjectHarness::new(LAYERED_CONFIG);
    let output = harness.run(&["completions", "bash"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("strata"));
}
