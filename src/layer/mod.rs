//! Named layers of modules used as rule operands.
//!
//! Layers are declared and populated in order:
//!
//! ```
//! use strata::layer::LayeredArchitecture;
//!
//! let mut architecture = LayeredArchitecture::new();
//! architecture
//!     .layer("core")?
//!     .containing_modules(["app.core"])?
//!     .layer("ui")?
//!     .having_modules_matching(r"app\.ui.*")?;
//! let mapping = architecture.mapping()?;
//! assert!(mapping.contains("ui"));
//! # Ok::<(), strata::error::ConfigurationError>(())
//! ```
//!
//! A module belongs to at most one layer. Overlapping literal filters are
//! rejected while populating; overlaps introduced by patterns are detected
//! once a graph is available ([`LayerMapping::check_disjoint`]).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigurationError;
use crate::filter::{resolve_all, ModuleFilter};
use crate::graph::DependencyGraph;
use crate::module::ModulePath;

pub mod state_machine;

pub use state_machine::LayerState;

#[derive(Debug, Clone)]
struct LayerEntry {
    name: String,
    state: LayerState,
    filters: Vec<ModuleFilter>,
}

/// Layer registry under construction.
#[derive(Debug, Clone, Default)]
pub struct LayeredArchitecture {
    layers: Vec<LayerEntry>,
}

impl LayeredArchitecture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new, still empty layer.
    ///
    /// # Errors
    ///
    /// Fails if an earlier layer has no modules yet, or `name` exists.
    pub fn declare(&mut self, name: &str) -> Result<(), ConfigurationError> {
        state_machine::check_declare(name, self.state(name), &self.unpopulated())?;
        self.layers.push(LayerEntry {
            name: name.to_string(),
            state: LayerState::Declared,
            filters: Vec::new(),
        });
        Ok(())
    }

    /// Attach the module filters of a declared layer.
    ///
    /// # Errors
    ///
    /// Fails if the layer was never declared or is already populated, if
    /// `filters` is empty, or if a literal filter names a module another
    /// layer already claims.
    pub fn assign(
        &mut self,
        name: &str,
        filters: Vec<ModuleFilter>,
    ) -> Result<(), ConfigurationError> {
        state_machine::check_populate(name, self.state(name))?;

        if filters.is_empty() {
            return Err(ConfigurationError::EmptyLayer(name.to_string()));
        }

        for other in self.layers.iter().filter(|l| l.name != name) {
            let duplicates: BTreeSet<String> = filters
                .iter()
                .filter(|filter| other.filters.iter().any(|claimed| filter.overlaps(claimed)))
                .map(ToString::to_string)
                .collect();
            if !duplicates.is_empty() {
                return Err(ConfigurationError::ModulesAlreadyAssigned {
                    modules: duplicates.into_iter().collect(),
                    layer: other.name.clone(),
                });
            }
        }

        let entry = self
            .layers
            .iter_mut()
            .find(|l| l.name == name)
            .ok_or_else(|| ConfigurationError::LayerNotDeclared(name.to_string()))?;
        entry.filters = filters;
        entry.state = LayerState::Populated;

        tracing::debug!(layer = name, filters = entry.filters.len(), "populated layer");
        Ok(())
    }

    /// Declare `name` and return a handle to populate it.
    ///
    /// The layer stays declared if populating it fails, and every later
    /// `declare` is then refused with `LayersUnpopulated`: a failed populate
    /// leaves the registry unusable.
    pub fn layer(&mut self, name: &str) -> Result<LayerDefinition<'_>, ConfigurationError> {
        self.declare(name)?;
        Ok(LayerDefinition {
            architecture: self,
            name: name.to_string(),
        })
    }

    pub fn state(&self, name: &str) -> Option<LayerState> {
        self.layers.iter().find(|l| l.name == name).map(|l| l.state)
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.name.as_str())
    }

    pub fn filters(&self, name: &str) -> Option<&[ModuleFilter]> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.filters.as_slice())
    }

    /// Layers declared but still waiting for modules.
    pub fn unpopulated(&self) -> Vec<String> {
        self.layers
            .iter()
            .filter(|l| l.state == LayerState::Declared)
            .map(|l| l.name.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Freeze the registry so rules can reference it.
    ///
    /// # Errors
    ///
    /// Fails if any layer is declared but not populated.
    pub fn mapping(&self) -> Result<Arc<LayerMapping>, ConfigurationError> {
        let unpopulated = self.unpopulated();
        if !unpopulated.is_empty() {
            return Err(ConfigurationError::LayersUnpopulated(unpopulated));
        }
        Ok(Arc::new(LayerMapping {
            layers: self
                .layers
                .iter()
                .map(|l| (l.name.clone(), l.filters.clone()))
                .collect(),
        }))
    }
}

impl fmt::Display for LayeredArchitecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layers: Vec<String> = self
            .layers
            .iter()
            .map(|l| format!("Layer {}: [{}]", l.name, join_filters(&l.filters)))
            .collect();
        write!(f, "Layered Architecture: {}", layers.join("; "))
    }
}

/// Handle returned by [`LayeredArchitecture::layer`].
pub struct LayerDefinition<'a> {
    architecture: &'a mut LayeredArchitecture,
    name: String,
}

impl<'a> LayerDefinition<'a> {
    /// Populate the layer with named modules (each including its submodules).
    pub fn containing_modules<I, S>(
        self,
        modules: I,
    ) -> Result<&'a mut LayeredArchitecture, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let filters = modules
            .into_iter()
            .map(|m| ModuleFilter::named(m.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.containing(filters)
    }

    /// Populate the layer with every module whose path matches `pattern`.
    pub fn having_modules_matching(
        self,
        pattern: &str,
    ) -> Result<&'a mut LayeredArchitecture, ConfigurationError> {
        let filter = ModuleFilter::matching(pattern)?;
        self.containing(vec![filter])
    }

    /// Populate the layer with arbitrary filters.
    pub fn containing(
        self,
        filters: Vec<ModuleFilter>,
    ) -> Result<&'a mut LayeredArchitecture, ConfigurationError> {
        self.architecture.assign(&self.name, filters)?;
        Ok(self.architecture)
    }
}

/// A complete, immutable set of layers shared by the rules referencing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerMapping {
    layers: Vec<(String, Vec<ModuleFilter>)>,
}

impl LayerMapping {
    pub fn contains(&self, name: &str) -> bool {
        self.layers.iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|(name, _)| name.as_str())
    }

    pub fn filters(&self, name: &str) -> Result<&[ModuleFilter], ConfigurationError> {
        self.layers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, filters)| filters.as_slice())
            .ok_or_else(|| ConfigurationError::UnknownLayer(name.to_string()))
    }

    /// Modules of the layer in `graph`: the union of its filters.
    pub fn expand(
        &self,
        name: &str,
        graph: &DependencyGraph,
    ) -> Result<BTreeSet<ModulePath>, ConfigurationError> {
        Ok(resolve_all(self.filters(name)?, graph))
    }

    pub fn expand_all<S: AsRef<str>>(
        &self,
        names: &[S],
        graph: &DependencyGraph,
    ) -> Result<BTreeSet<ModulePath>, ConfigurationError> {
        let mut modules = BTreeSet::new();
        for name in names {
            modules.extend(self.expand(name.as_ref(), graph)?);
        }
        Ok(modules)
    }

    /// Name of the layer `module` belongs to, if any.
    pub fn layer_of(&self, module: &ModulePath) -> Option<&str> {
        self.layers
            .iter()
            .find(|(_, filters)| filters.iter().any(|f| f.matches(module)))
            .map(|(name, _)| name.as_str())
    }

    /// Verify that no graph module is claimed by two layers.
    pub fn check_disjoint(&self, graph: &DependencyGraph) -> Result<(), ConfigurationError> {
        let mut owners: BTreeMap<ModulePath, &str> = BTreeMap::new();
        for (name, filters) in &self.layers {
            for module in resolve_all(filters, graph) {
                if let Some(first) = owners.get(&module) {
                    return Err(ConfigurationError::OverlappingLayers {
                        module,
                        first: first.to_string(),
                        second: name.clone(),
                    });
                }
                owners.insert(module, name.as_str());
            }
        }
        Ok(())
    }
}

fn join_filters(filters: &[ModuleFilter]) -> String {
    filters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
