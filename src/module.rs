//! Dotted module paths and the structural relations derived from them.
//!
//! A [`ModulePath`] is the identity of every node in a dependency graph. The
//! ancestor/descendant relation is derived from whole path segments only, so
//! `a.bc` is never considered to live under `a.b`.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Separator between the segments of a module path.
pub const SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModulePathError {
    #[error("Module path cannot be empty")]
    Empty,
    #[error("Module path '{0}' contains an empty segment")]
    EmptySegment(String),
}

/// A canonical dotted module path such as `app.core.model`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModulePath(String);

impl ModulePath {
    /// Parse a dotted path.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or any segment is empty
    /// (`a..b`, `.a`, `a.`).
    pub fn parse(input: &str) -> Result<Self, ModulePathError> {
        if input.is_empty() {
            return Err(ModulePathError::Empty);
        }
        if input.split(SEPARATOR).any(str::is_empty) {
            return Err(ModulePathError::EmptySegment(input.to_string()));
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// Number of segments; a top-level module has depth 1.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Last segment of the path.
    pub fn leaf(&self) -> &str {
        self.0
            .rsplit_once(SEPARATOR)
            .map_or(self.0.as_str(), |(_, leaf)| leaf)
    }

    pub fn parent(&self) -> Option<ModulePath> {
        self.0
            .rsplit_once(SEPARATOR)
            .map(|(parent, _)| ModulePath(parent.to_string()))
    }

    /// All strict ancestors, outermost first.
    pub fn ancestors(&self) -> Vec<ModulePath> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(parent) = current {
            current = parent.parent();
            ancestors.push(parent);
        }
        ancestors.reverse();
        ancestors
    }

    /// Append a single segment.
    pub fn child(&self, segment: &str) -> Result<ModulePath, ModulePathError> {
        if segment.is_empty() || segment.contains(SEPARATOR) {
            return Err(ModulePathError::EmptySegment(format!(
                "{}{}{}",
                self.0, SEPARATOR, segment
            )));
        }
        Ok(ModulePath(format!("{}{}{}", self.0, SEPARATOR, segment)))
    }

    /// Place this path under `namespace`: `b.c` prefixed with `a` is `a.b.c`.
    pub fn prefixed_with(&self, namespace: &ModulePath) -> ModulePath {
        ModulePath(format!("{}{}{}", namespace.0, SEPARATOR, self.0))
    }

    /// Keep at most `depth` leading segments. A depth of zero keeps the first
    /// segment, since a path cannot be empty.
    pub fn truncated(&self, depth: usize) -> ModulePath {
        let depth = depth.max(1);
        match self.0.match_indices(SEPARATOR).nth(depth - 1) {
            Some((index, _)) => ModulePath(self.0[..index].to_string()),
            None => self.clone(),
        }
    }

    /// True iff `other` is this path followed by a separator and a non-empty
    /// suffix. A path is never its own ancestor.
    pub fn is_ancestor_of(&self, other: &ModulePath) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0[self.0.len()..].starts_with(SEPARATOR)
    }

    pub fn is_descendant_of(&self, other: &ModulePath) -> bool {
        other.is_ancestor_of(self)
    }

    /// Equal to `other` or one of its descendants.
    pub fn is_within(&self, other: &ModulePath) -> bool {
        self == other || other.is_ancestor_of(self)
    }
}

impl Display for ModulePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ModulePath {
    type Err = ModulePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ModulePath {
    type Error = ModulePathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ModulePath> for String {
    fn from(path: ModulePath) -> Self {
        path.0
    }
}

impl AsRef<str> for ModulePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
