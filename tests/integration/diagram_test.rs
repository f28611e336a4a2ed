//! Diagram rules checked against the layered fixture.

use strata::diagram::{DiagramRule, PumlParser};

use crate::support::fixtures::{fixture_path, layered_graph};

#[test]
fn test_component_diagram_matches_code() {
    let graph = layered_graph();
    let diagram = DiagramRule::from_file(&fixture_path("components.puml"))
        .unwrap()
        .base_module("app")
        .unwrap();

    diagram.assert_applies(&graph).unwrap();
    diagram.clone().should_only().assert_applies(&graph).unwrap();
}

#[test]
fn test_fixture_diagram_parses() {
    let parsed = PumlParser::new()
        .parse(&fixture_path("components.puml"))
        .unwrap();
    assert_eq!(parsed.all_modules.len(), 3);
    assert_eq!(parsed.dependencies_of("ui").len(), 2);
    assert_eq!(parsed.dependencies_of("core").len(), 1);
}

#[test]
fn test_diagram_without_arrow_reports_all_edges() {
    let graph = layered_graph();
    let diagram: DiagramRule = "@startuml\n[core] --> [util]\n[ui]\n@enduml"
        .parse::<DiagramRule>()
        .unwrap()
        .base_module("app")
        .unwrap();

    let err = diagram.assert_applies(&graph).unwrap_err();
    let violation = err.violation().unwrap();
    assert!(violation.contains("app.ui.view", "app.core.model"));
    assert!(violation.contains("app.ui.view", "app.util"));
    assert_eq!(violation.violations.len(), 2);
}

#[test]
fn test_diagram_as_dependency_source() {
    let source = PumlParser::new()
        .parse(&fixture_path("components.puml"))
        .unwrap()
        .into_source()
        .unwrap();
    let graph = strata::graph::DependencyGraph::from_source(&source).unwrap();
    assert_eq!(graph.import_count(), 3);
}
