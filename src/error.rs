//! Error taxonomy shared by graph construction, layer setup and rule checks.
//!
//! Configuration errors describe a defect in the declared architecture and
//! abort the current operation. Rule violations are the expected product
//! output and carry their full evidence.

use thiserror::Error;

use crate::diagram::DiagramParseError;
use crate::module::{ModulePath, ModulePathError};
use crate::rule::RuleViolation;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    InvalidModulePath(#[from] ModulePathError),

    #[error("Invalid module pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Layer {0} already exists.")]
    LayerAlreadyExists(String),

    #[error("Specify the modules of layer(s) {} first.", .0.join(", "))]
    LayersUnpopulated(Vec<String>),

    #[error("Specify layer name before specifying its modules: layer {0} was never declared.")]
    LayerNotDeclared(String),

    #[error("Layer {0} already has modules assigned.")]
    LayerAlreadyPopulated(String),

    #[error("Layer {0} needs at least one module filter.")]
    EmptyLayer(String),

    #[error("Module(s) {} already assigned to layer {layer}.", .modules.join(", "))]
    ModulesAlreadyAssigned { modules: Vec<String>, layer: String },

    #[error("Module {module} belongs to both layer {first} and layer {second}.")]
    OverlappingLayers {
        module: ModulePath,
        first: String,
        second: String,
    },

    #[error("Unknown layer '{0}'.")]
    UnknownLayer(String),

    #[error("Import {importer} -> {imported} references unknown module {module}.")]
    UnknownModule {
        module: ModulePath,
        importer: ModulePath,
        imported: ModulePath,
    },

    #[error("Focus path {0} does not name a module of the analyzed project.")]
    UnknownFocus(ModulePath),

    #[error("Rule '{0}' cannot apply: its subject matches no module in the graph.")]
    EmptySubject(String),

    #[error("{0}")]
    Invalid(String),
}

/// Error returned by the assertion entry points.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Parse(#[from] DiagramParseError),

    #[error(transparent)]
    Violation(#[from] RuleViolation),
}

impl CheckError {
    /// The violation carried by this error, if the codebase broke a rule.
    pub fn violation(&self) -> Option<&RuleViolation> {
        match self {
            CheckError::Violation(violation) => Some(violation),
            _ => None,
        }
    }

    pub fn is_violation(&self) -> bool {
        self.violation().is_some()
    }
}

impl From<ModulePathError> for CheckError {
    fn from(err: ModulePathError) -> Self {
        CheckError::Configuration(err.into())
    }
}
