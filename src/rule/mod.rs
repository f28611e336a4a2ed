//! Architectural rules and their evaluation.
//!
//! A [`Rule`] is an immutable value: a subject operand, a [`Behavior`], a
//! [`Direction`] and an [`ObjectScope`]. Rules are assembled with the staged
//! builder in [`builder`] and evaluated by [`matcher::RuleMatcher`].
//!
//! ```
//! use strata::graph::DependencyGraph;
//! use strata::rule::Rule;
//! use strata::source::DependencySource;
//!
//! let source = DependencySource::parse_yaml(
//!     "modules: [ui, ui.view, core, core.model]\n\
//!      imports: [{ importer: ui.view, imported: core.model }]",
//! )
//! .unwrap();
//! let graph = DependencyGraph::from_source(&source)?;
//!
//! let rule = Rule::modules_that()
//!     .are_named(["core"])?
//!     .should_not()
//!     .import_modules_that()
//!     .are_named(["ui"])?;
//! rule.assert_applies(&graph)?;
//! # Ok::<(), strata::error::CheckError>(())
//! ```

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{CheckError, ConfigurationError};
use crate::filter::{resolve_all, ModuleFilter};
use crate::graph::DependencyGraph;
use crate::layer::LayerMapping;
use crate::module::ModulePath;

pub mod builder;
pub mod matcher;
pub mod verdict;

pub use builder::{Layers, Modules, RuleAccess, RuleBehavior, RuleObject, RuleSubject};
pub use matcher::RuleMatcher;
pub use verdict::{RuleViolation, RuleWarning, Verdict, Violation, ViolationClause};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    MustAccess,
    MustOnlyAccess,
    MustNotAccess,
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Behavior::MustAccess => write!(f, "should"),
            Behavior::MustOnlyAccess => write!(f, "should only"),
            Behavior::MustNotAccess => write!(f, "should not"),
        }
    }
}

/// Which way the dependency between subject and object points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The subject imports the object.
    Imports,
    /// The object imports the subject.
    ImportedBy,
}

/// Modules a rule talks about, before resolution against a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Modules(Vec<ModuleFilter>),
    Layers {
        names: Vec<String>,
        mapping: Arc<LayerMapping>,
    },
}

impl Operand {
    /// Concrete modules of this operand in `graph`.
    pub fn resolve(&self, graph: &DependencyGraph) -> Result<BTreeSet<ModulePath>, ConfigurationError> {
        match self {
            Operand::Modules(filters) => Ok(resolve_all(filters, graph)),
            Operand::Layers { names, mapping } => mapping.expand_all(names, graph),
        }
    }

    pub fn layer_mapping(&self) -> Option<&LayerMapping> {
        match self {
            Operand::Modules(_) => None,
            Operand::Layers { mapping, .. } => Some(mapping),
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            Operand::Modules(_) => "modules",
            Operand::Layers { .. } => "layers",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Modules(filters) => {
                let names: Vec<String> = filters.iter().map(ToString::to_string).collect();
                write!(f, "modules [{}]", names.join(", "))
            }
            Operand::Layers { names, .. } => write!(f, "layers [{}]", names.join(", ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectScope {
    Named(Operand),
    /// Every module outside the subject.
    Any,
    /// Every module outside the subject, minus the operand.
    Except(Operand),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    subject: Operand,
    behavior: Behavior,
    direction: Direction,
    object: ObjectScope,
}

impl Rule {
    pub fn new(
        subject: Operand,
        behavior: Behavior,
        direction: Direction,
        object: ObjectScope,
    ) -> Self {
        Self {
            subject,
            behavior,
            direction,
            object,
        }
    }

    /// Start a rule about modules.
    pub fn modules_that() -> RuleSubject<Modules> {
        RuleSubject::new(Modules)
    }

    /// Start a rule about layers of `mapping`.
    pub fn layers_that(mapping: &Arc<LayerMapping>) -> RuleSubject<Layers> {
        RuleSubject::new(Layers::new(Arc::clone(mapping)))
    }

    pub fn subject(&self) -> &Operand {
        &self.subject
    }

    pub fn behavior(&self) -> Behavior {
        self.behavior
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn object(&self) -> &ObjectScope {
        &self.object
    }

    /// Human-readable description of the object side.
    pub fn describe_object(&self) -> String {
        let noun = self.subject.noun();
        match &self.object {
            ObjectScope::Named(operand) => operand.to_string(),
            ObjectScope::Any => format!("any of the {}", noun),
            ObjectScope::Except(operand) => format!("any {} except {}", noun, operand),
        }
    }

    /// Evaluate without raising on violations.
    pub fn evaluate(&self, graph: &DependencyGraph) -> Result<Verdict, ConfigurationError> {
        RuleMatcher::new(graph).evaluate(self)
    }

    /// Evaluate and fail with the full evidence if the graph breaks the rule.
    pub fn assert_applies(&self, graph: &DependencyGraph) -> Result<(), CheckError> {
        assert_applies(self, graph)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match (self.direction, &self.subject) {
            (Direction::Imports, Operand::Modules(_)) => "import",
            (Direction::Imports, Operand::Layers { .. }) => "access",
            (Direction::ImportedBy, Operand::Modules(_)) => "be imported by",
            (Direction::ImportedBy, Operand::Layers { .. }) => "be accessed by",
        };
        write!(
            f,
            "{} {} {} {}",
            self.subject,
            self.behavior,
            verb,
            self.describe_object()
        )
    }
}

/// Entry point for test suites: `Ok(())` when `graph` satisfies `rule`.
///
/// # Errors
///
/// - [`CheckError::Violation`] with every offending edge when the rule is broken.
/// - [`CheckError::Configuration`] when the rule cannot be evaluated (its
///   subject matches nothing, a layer is unknown, layers overlap).
pub fn assert_applies(rule: &Rule, graph: &DependencyGraph) -> Result<(), CheckError> {
    let verdict = rule.evaluate(graph)?;
    if verdict.passed() {
        return Ok(());
    }
    Err(CheckError::Violation(RuleViolation::new(
        rule,
        verdict.violations,
    )))
}
