//! Text and Graphviz renderings of a dependency graph.

use super::{DependencyGraph, EdgeKind};

/// Render the graph as a Graphviz digraph. Containment edges are dashed and
/// external modules drawn as boxes.
pub fn to_dot(graph: &DependencyGraph, include_containment: bool) -> String {
    let mut output = String::from("digraph dependencies {\n    rankdir=LR;\n");

    for module in graph.all_modules() {
        let shape = if graph.is_external(module) {
            "box"
        } else {
            "ellipse"
        };
        output.push_str(&format!("    \"{}\" [shape={}];\n", module, shape));
    }

    for (edge, kind) in graph.all_edges() {
        match kind {
            EdgeKind::Import => {
                output.push_str(&format!(
                    "    \"{}\" -> \"{}\";\n",
                    edge.importer, edge.imported
                ));
            }
            EdgeKind::Containment if include_containment => {
                output.push_str(&format!(
                    "    \"{}\" -> \"{}\" [style=dashed, arrowhead=none];\n",
                    edge.importer, edge.imported
                ));
            }
            EdgeKind::Containment => {}
        }
    }

    output.push_str("}\n");
    output
}

/// One line per edge: `a -> b` for imports, `a ⊃ b` for containment.
pub fn to_text(graph: &DependencyGraph, include_containment: bool) -> String {
    if graph.node_count() == 0 {
        return "(empty graph)".to_string();
    }

    let mut lines = Vec::new();
    for (edge, kind) in graph.all_edges() {
        match kind {
            EdgeKind::Import => {
                let marker = if graph.is_external(&edge.imported) {
                    " (external)"
                } else {
                    ""
                };
                lines.push(format!("{} -> {}{}", edge.importer, edge.imported, marker));
            }
            EdgeKind::Containment if include_containment => {
                lines.push(format!("{} ⊃ {}", edge.importer, edge.imported));
            }
            EdgeKind::Containment => {}
        }
    }

    if lines.is_empty() {
        return "(no dependencies)".to_string();
    }
    lines.join("\n")
}
