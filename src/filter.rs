//! Module filters: the predicates rule operands and layers are built from.
//!
//! A filter resolves against a concrete graph into a set of modules:
//! - [`ModuleFilter::Named`] matches a module and everything below it,
//! - [`ModuleFilter::Exact`] matches that one module only,
//! - [`ModuleFilter::Pattern`] matches whole paths against a regex, with no
//!   implicit descendants.

use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

use crate::error::ConfigurationError;
use crate::graph::DependencyGraph;
use crate::module::ModulePath;

/// A compiled regex that remembers its source text.
#[derive(Debug, Clone)]
pub struct ModulePattern {
    source: String,
    regex: Regex,
}

impl ModulePattern {
    /// Compile `pattern`, anchored so it must match the whole dotted path.
    pub fn new(pattern: &str) -> Result<Self, ConfigurationError> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            ConfigurationError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, module: &ModulePath) -> bool {
        self.regex.is_match(module.as_str())
    }
}

impl PartialEq for ModulePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for ModulePattern {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleFilter {
    /// The module and all of its descendants.
    Named(ModulePath),
    /// The module alone.
    Exact(ModulePath),
    Pattern(ModulePattern),
}

impl ModuleFilter {
    pub fn named(path: &str) -> Result<Self, ConfigurationError> {
        Ok(ModuleFilter::Named(ModulePath::parse(path)?))
    }

    pub fn exact(path: &str) -> Result<Self, ConfigurationError> {
        Ok(ModuleFilter::Exact(ModulePath::parse(path)?))
    }

    pub fn matching(pattern: &str) -> Result<Self, ConfigurationError> {
        Ok(ModuleFilter::Pattern(ModulePattern::new(pattern)?))
    }

    pub fn matches(&self, module: &ModulePath) -> bool {
        match self {
            ModuleFilter::Named(path) => module.is_within(path),
            ModuleFilter::Exact(path) => module == path,
            ModuleFilter::Pattern(pattern) => pattern.is_match(module),
        }
    }

    /// Every graph module this filter selects. An empty result is not an error.
    pub fn resolve(&self, graph: &DependencyGraph) -> BTreeSet<ModulePath> {
        match self {
            ModuleFilter::Exact(path) => graph
                .contains(path)
                .then(|| path.clone())
                .into_iter()
                .collect(),
            _ => graph
                .all_modules()
                .iter()
                .filter(|module| self.matches(module))
                .cloned()
                .collect(),
        }
    }

    /// The literal path, for named and exact filters.
    pub fn literal(&self) -> Option<&ModulePath> {
        match self {
            ModuleFilter::Named(path) | ModuleFilter::Exact(path) => Some(path),
            ModuleFilter::Pattern(_) => None,
        }
    }

    /// Whether two literal filters necessarily select a common module.
    ///
    /// Patterns can only be compared against a concrete graph and always
    /// report `false` here.
    pub fn overlaps(&self, other: &ModuleFilter) -> bool {
        use ModuleFilter::*;

        match (self, other) {
            (Named(a), Named(b)) => a.is_within(b) || b.is_within(a),
            (Named(a), Exact(b)) | (Exact(b), Named(a)) => b.is_within(a),
            (Exact(a), Exact(b)) => a == b,
            (Pattern(_), _) | (_, Pattern(_)) => false,
        }
    }
}

impl fmt::Display for ModuleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleFilter::Named(path) => write!(f, "{}", path),
            ModuleFilter::Exact(path) => write!(f, "{} (exactly)", path),
            ModuleFilter::Pattern(pattern) => write!(f, "/{}/", pattern.as_str()),
        }
    }
}

/// Union of what every filter resolves to.
pub fn resolve_all<'a>(
    filters: impl IntoIterator<Item = &'a ModuleFilter>,
    graph: &DependencyGraph,
) -> BTreeSet<ModulePath> {
    filters
        .into_iter()
        .flat_map(|filter| filter.resolve(graph))
        .collect()
}
