//! Directed module dependency graph.
//!
//! The graph holds two disjoint edge classes: import edges taken from a
//! [`DependencySource`], and containment edges derived from the module
//! hierarchy. Containment is structural and never shows up in the dependency
//! queries ([`DependencyGraph::edges`], [`DependencyGraph::has_edge`], ...).
//!
//! Construction can be narrowed with [`GraphOptions`]:
//! - a focus path keeps only imports that originate inside one subtree,
//! - a level limit aggregates deep modules into their ancestor at that level,
//! - external targets are dropped unless explicitly included.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::fmt;

use crate::error::ConfigurationError;
use crate::module::ModulePath;
use crate::source::{DependencyEdge, DependencySource};

pub mod render;


/// Tag distinguishing dependencies from structural parent/child links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Import,
    Containment,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Import => write!(f, "import"),
            EdgeKind::Containment => write!(f, "containment"),
        }
    }
}

/// Options controlling which part of a dependency source becomes the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Subtree the analysis is restricted to. Node names stay rooted at the
    /// project root.
    pub focus: Option<ModulePath>,
    /// Keep imports whose target lies outside the analyzed project.
    pub include_external: bool,
    /// Aggregate modules to at most `level_limit + 1` segments.
    pub level_limit: Option<usize>,
}

impl GraphOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_focus(mut self, focus: ModulePath) -> Self {
        self.focus = Some(focus);
        self
    }

    pub fn include_external(mut self, include: bool) -> Self {
        self.include_external = include;
        self
    }

    pub fn with_level_limit(mut self, level_limit: usize) -> Self {
        self.level_limit = Some(level_limit);
        self
    }

    fn in_scope(&self, module: &ModulePath) -> bool {
        self.focus
            .as_ref()
            .map_or(true, |focus| module.is_within(focus))
    }

    /// Name a module takes in the aggregated view.
    pub fn flatten(&self, module: &ModulePath) -> ModulePath {
        match self.level_limit {
            Some(limit) => module.truncated(limit + 1),
            None => module.clone(),
        }
    }
}

/// Read-only dependency graph over dotted modules.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeSet<ModulePath>,
    external: BTreeSet<ModulePath>,
    imports: BTreeMap<ModulePath, BTreeSet<ModulePath>>,
    importers: BTreeMap<ModulePath, BTreeSet<ModulePath>>,
    children: BTreeMap<ModulePath, BTreeSet<ModulePath>>,
    options: GraphOptions,
}

impl DependencyGraph {
    /// Build the whole-project graph, external imports excluded.
    pub fn from_source(source: &DependencySource) -> Result<Self, ConfigurationError> {
        Self::build(source, GraphOptions::default())
    }

    /// Build a graph from adapter output.
    ///
    /// # Errors
    ///
    /// - `UnknownModule` if an import's importer is not an internal module, or
    ///   its target is neither internal nor declared external.
    /// - `UnknownFocus` if the focus path contains no internal module.
    pub fn build(
        source: &DependencySource,
        options: GraphOptions,
    ) -> Result<Self, ConfigurationError> {
        validate_source(source)?;

        if let Some(focus) = &options.focus {
            if !source.modules.iter().any(|m| m.is_within(focus)) {
                return Err(ConfigurationError::UnknownFocus(focus.clone()));
            }
        }

        let mut graph = DependencyGraph {
            options,
            ..Default::default()
        };

        for module in source.modules.iter().filter(|m| graph.options.in_scope(m)) {
            let node = graph.options.flatten(module);
            graph.nodes.insert(node);
        }

        if let Some(focus) = graph.options.focus.clone() {
            for ancestor in focus.ancestors() {
                if source.is_internal(&ancestor) {
                    let node = graph.options.flatten(&ancestor);
                    graph.nodes.insert(node);
                }
            }
        }

        for edge in &source.imports {
            if !graph.options.in_scope(&edge.importer) {
                continue;
            }

            // Anything outside the focus subtree is outside the analyzed project.
            let leaves_project =
                !source.is_internal(&edge.imported) || !graph.options.in_scope(&edge.imported);
            if leaves_project && !graph.options.include_external {
                continue;
            }

            let flattened = DependencyEdge::new(
                graph.options.flatten(&edge.importer),
                graph.options.flatten(&edge.imported),
            );
            if flattened.is_self_loop() {
                continue;
            }
            let DependencyEdge { importer, imported } = flattened;

            if leaves_project {
                graph.add_outside_node(&imported, source);
            }
            graph.add_import(importer, imported);
        }

        graph.derive_containment();

        tracing::debug!(
            nodes = graph.nodes.len(),
            imports = graph.import_count(),
            containment = graph.containment_count(),
            focus = ?graph.options.focus,
            level_limit = ?graph.options.level_limit,
            "built dependency graph"
        );

        Ok(graph)
    }

    /// Insert a node reached through an import leaving the project, together
    /// with those of its ancestors the source knows about.
    fn add_outside_node(&mut self, module: &ModulePath, source: &DependencySource) {
        for ancestor in module.ancestors() {
            if source.is_known(&ancestor) {
                if source.is_external(&ancestor) {
                    self.external.insert(ancestor.clone());
                }
                self.nodes.insert(ancestor);
            }
        }
        // Out-of-focus project modules stay internal; only names with no
        // project module at or below them are external.
        if !source.modules.iter().any(|m| m.is_within(module)) {
            self.external.insert(module.clone());
        }
        self.nodes.insert(module.clone());
    }

    fn add_import(&mut self, importer: ModulePath, imported: ModulePath) {
        self.nodes.insert(importer.clone());
        self.nodes.insert(imported.clone());
        self.importers
            .entry(imported.clone())
            .or_default()
            .insert(importer.clone());
        self.imports.entry(importer).or_default().insert(imported);
    }

    fn derive_containment(&mut self) {
        let mut children: BTreeMap<ModulePath, BTreeSet<ModulePath>> = BTreeMap::new();
        for node in &self.nodes {
            if let Some(parent) = node.parent() {
                if self.nodes.contains(&parent) {
                    children.entry(parent).or_default().insert(node.clone());
                }
            }
        }
        self.children = children;
    }

    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    /// Every node, internal and external, in path order.
    pub fn all_modules(&self) -> &BTreeSet<ModulePath> {
        &self.nodes
    }

    pub fn internal_modules(&self) -> impl Iterator<Item = &ModulePath> {
        self.nodes.iter().filter(|m| !self.external.contains(*m))
    }

    pub fn contains(&self, module: &ModulePath) -> bool {
        self.nodes.contains(module)
    }

    pub fn is_external(&self, module: &ModulePath) -> bool {
        self.external.contains(module)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Import edges only, sorted by importer then imported.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.imports
            .iter()
            .flat_map(|(importer, targets)| {
                targets
                    .iter()
                    .map(move |imported| DependencyEdge::new(importer.clone(), imported.clone()))
            })
            .collect()
    }

    /// Structural parent -> child edges.
    pub fn containment_edges(&self) -> Vec<DependencyEdge> {
        self.children
            .iter()
            .flat_map(|(parent, children)| {
                children
                    .iter()
                    .map(move |child| DependencyEdge::new(parent.clone(), child.clone()))
            })
            .collect()
    }

    /// Both edge classes, each tagged with its kind.
    pub fn all_edges(&self) -> Vec<(DependencyEdge, EdgeKind)> {
        let mut edges: Vec<(DependencyEdge, EdgeKind)> = self
            .edges()
            .into_iter()
            .map(|edge| (edge, EdgeKind::Import))
            .chain(
                self.containment_edges()
                    .into_iter()
                    .map(|edge| (edge, EdgeKind::Containment)),
            )
            .collect();
        edges.sort();
        edges
    }

    pub fn import_count(&self) -> usize {
        self.imports.values().map(BTreeSet::len).sum()
    }

    pub fn containment_count(&self) -> usize {
        self.children.values().map(BTreeSet::len).sum()
    }

    /// True if `importer` has a direct import edge to `imported`.
    pub fn has_edge(&self, importer: &ModulePath, imported: &ModulePath) -> bool {
        self.imports
            .get(importer)
            .is_some_and(|targets| targets.contains(imported))
    }

    pub fn is_containment_edge(&self, parent: &ModulePath, child: &ModulePath) -> bool {
        self.children
            .get(parent)
            .is_some_and(|children| children.contains(child))
    }

    /// Nodes strictly below `module` in the hierarchy.
    pub fn descendants_of(&self, module: &ModulePath) -> BTreeSet<ModulePath> {
        self.nodes
            .iter()
            .filter(|node| node.is_descendant_of(module))
            .cloned()
            .collect()
    }

    /// Modules `module` imports directly.
    pub fn successors(&self, module: &ModulePath) -> Vec<&ModulePath> {
        self.imports
            .get(module)
            .map(|targets| targets.iter().collect())
            .unwrap_or_default()
    }

    /// Modules importing `module` directly.
    pub fn predecessors(&self, module: &ModulePath) -> Vec<&ModulePath> {
        self.importers
            .get(module)
            .map(|sources| sources.iter().collect())
            .unwrap_or_default()
    }

    /// True if a chain of import edges leads from `from` to `to`.
    pub fn depends_transitively(&self, from: &ModulePath, to: &ModulePath) -> bool {
        let mut visited: HashSet<&ModulePath> = HashSet::new();
        let mut queue: VecDeque<&ModulePath> = VecDeque::new();
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for next in self.successors(current) {
                if next == to {
                    return true;
                }
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        false
    }
}

fn validate_source(source: &DependencySource) -> Result<(), ConfigurationError> {
    for edge in &source.imports {
        if !source.is_internal(&edge.importer) {
            return Err(ConfigurationError::UnknownModule {
                module: edge.importer.clone(),
                importer: edge.importer.clone(),
                imported: edge.imported.clone(),
            });
        }
        if !source.is_known(&edge.imported) {
            return Err(ConfigurationError::UnknownModule {
                module: edge.imported.clone(),
                importer: edge.importer.clone(),
                imported: edge.imported.clone(),
            });
        }
    }
    Ok(())
}
