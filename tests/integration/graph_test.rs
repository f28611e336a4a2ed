//! Graph construction over the sample manifest: focus, level limit, externals.

use strata::filter::ModuleFilter;
use strata::graph::GraphOptions;
use strata::module::ModulePath;

use crate::support::fixtures::sample_graph;

fn path(s: &str) -> ModulePath {
    ModulePath::parse(s).unwrap()
}

fn edge_names(graph: &strata::graph::DependencyGraph) -> Vec<(String, String)> {
    graph
        .edges()
        .into_iter()
        .map(|e| (e.importer.to_string(), e.imported.to_string()))
        .collect()
}

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

#[test]
fn test_full_graph_drops_external_imports() {
    let graph = sample_graph(GraphOptions::new());

    assert_eq!(graph.node_count(), 8);
    assert_eq!(
        edge_names(&graph),
        pairs(&[
            ("src.moduleA.submoduleA1.submoduleA11", "src.moduleB"),
            ("src.moduleA.submoduleA2", "src.moduleA.submoduleA1"),
            ("src.moduleB", "src.moduleC"),
            ("src.moduleD", "src.moduleA.submoduleA2"),
        ])
    );
    assert!(!graph.contains(&path("os.path")));
}

#[test]
fn test_include_external_adds_external_nodes() {
    let graph = sample_graph(GraphOptions::new().include_external(true));

    assert!(graph.has_edge(&path("src.moduleC"), &path("os.path")));
    assert!(graph.is_external(&path("os")));
    assert!(graph.is_external(&path("os.path")));
    assert!(graph.is_containment_edge(&path("os"), &path("os.path")));
}

#[test]
fn test_containment_is_never_an_import() {
    let graph = sample_graph(GraphOptions::new());

    assert!(graph.is_containment_edge(&path("src"), &path("src.moduleA")));
    assert!(!graph.has_edge(&path("src"), &path("src.moduleA")));
    assert!(graph
        .edges()
        .iter()
        .all(|e| !graph.is_containment_edge(&e.importer, &e.imported)));
}

#[test]
fn test_focus_keeps_only_imports_made_inside_the_subtree() {
    let graph = sample_graph(
        GraphOptions::new()
            .with_focus(path("src.moduleA"))
            .include_external(true),
    );

    assert_eq!(
        edge_names(&graph),
        pairs(&[
            ("src.moduleA.submoduleA1.submoduleA11", "src.moduleB"),
            ("src.moduleA.submoduleA2", "src.moduleA.submoduleA1"),
        ])
    );
    assert!(!graph.is_external(&path("src.moduleB")));
    assert!(!graph.contains(&path("src.moduleD")));
}

#[test]
fn test_focus_without_external_stays_inside() {
    let graph = sample_graph(GraphOptions::new().with_focus(path("src.moduleA")));

    assert_eq!(
        edge_names(&graph),
        pairs(&[("src.moduleA.submoduleA2", "src.moduleA.submoduleA1")])
    );
}

#[test]
fn test_level_limit_aggregates_edges() {
    let graph = sample_graph(GraphOptions::new().with_level_limit(1));

    assert_eq!(
        edge_names(&graph),
        pairs(&[
            ("src.moduleA", "src.moduleB"),
            ("src.moduleB", "src.moduleC"),
            ("src.moduleD", "src.moduleA"),
        ])
    );
    assert!(!graph.contains(&path("src.moduleA.submoduleA1")));
}

#[test]
fn test_transitive_dependency() {
    let graph = sample_graph(GraphOptions::new());

    assert!(graph.depends_transitively(&path("src.moduleD"), &path("src.moduleC")));
    assert!(!graph.depends_transitively(&path("src.moduleC"), &path("src.moduleD")));
}

#[test]
fn test_literal_filter_includes_submodules_only() {
    let graph = sample_graph(GraphOptions::new());

    let resolved = ModuleFilter::named("src.moduleA").unwrap().resolve(&graph);
    assert_eq!(resolved.len(), 4);
    assert!(resolved.contains(&path("src.moduleA.submoduleA1.submoduleA11")));
    assert!(!resolved.contains(&path("src.moduleB")));

    let exact = ModuleFilter::exact("src.moduleA").unwrap().resolve(&graph);
    assert_eq!(exact.len(), 1);
}
