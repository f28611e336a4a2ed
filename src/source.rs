//! Raw dependency data handed to the graph by an extraction adapter.
//!
//! Whatever produced the data (a source parser, a diagram, a hand-written
//! manifest) the graph only ever sees a [`DependencySource`]: the internal
//! modules, the known external modules, and the import pairs between them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::module::{ModulePath, ModulePathError};

/// An ordered `(importer, imported)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub importer: ModulePath,
    pub imported: ModulePath,
}

impl DependencyEdge {
    pub fn new(importer: ModulePath, imported: ModulePath) -> Self {
        Self { importer, imported }
    }

    /// Parse both endpoints from dotted strings.
    pub fn parse(importer: &str, imported: &str) -> Result<Self, ModulePathError> {
        Ok(Self::new(
            ModulePath::parse(importer)?,
            ModulePath::parse(imported)?,
        ))
    }

    pub fn is_self_loop(&self) -> bool {
        self.importer == self.imported
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.importer, self.imported)
    }
}

/// Modules and imports as produced by an adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySource {
    /// Modules of the analyzed project.
    #[serde(default)]
    pub modules: BTreeSet<ModulePath>,
    /// Importable modules outside the project (standard library, third party).
    #[serde(default)]
    pub external: BTreeSet<ModulePath>,
    #[serde(default)]
    pub imports: Vec<DependencyEdge>,
}

impl DependencySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest; `.json` files are read as JSON, everything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dependency manifest {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::parse_json(&content)
                .with_context(|| format!("Failed to parse JSON manifest {}", path.display()))
        } else {
            Self::parse_yaml(&content)
                .with_context(|| format!("Failed to parse YAML manifest {}", path.display()))
        }
    }

    pub fn parse_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Invalid dependency manifest")
    }

    pub fn parse_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid dependency manifest")
    }

    pub fn add_module(&mut self, module: ModulePath) -> &mut Self {
        self.modules.insert(module);
        self
    }

    pub fn add_external(&mut self, module: ModulePath) -> &mut Self {
        self.external.insert(module);
        self
    }

    pub fn add_import(&mut self, importer: ModulePath, imported: ModulePath) -> &mut Self {
        self.imports.push(DependencyEdge::new(importer, imported));
        self
    }

    /// Add every ancestor of every internal module, so packages that only
    /// exist implicitly (`app` for `app.core`) become modules too.
    pub fn with_ancestors(mut self) -> Self {
        let ancestors: Vec<ModulePath> = self
            .modules
            .iter()
            .flat_map(ModulePath::ancestors)
            .collect();
        self.modules.extend(ancestors);
        self
    }

    pub fn is_internal(&self, module: &ModulePath) -> bool {
        self.modules.contains(module)
    }

    pub fn is_external(&self, module: &ModulePath) -> bool {
        !self.modules.contains(module) && self.external.contains(module)
    }

    /// Internal or external, i.e. something an import may legally target.
    pub fn is_known(&self, module: &ModulePath) -> bool {
        self.modules.contains(module) || self.external.contains(module)
    }
}
