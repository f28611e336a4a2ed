//! Evaluation results.

use serde::Serialize;
use std::fmt;

use super::Rule;
use crate::module::ModulePath;
use crate::source::DependencyEdge;

/// Which clause of the behavior an edge broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationClause {
    /// An edge into a forbidden object module.
    ForbiddenAccess,
    /// An edge to a module that is neither subject nor object.
    AccessOutsideAllowed,
    /// Evidence that a subject module never reaches the object.
    MissingAccess,
}

impl fmt::Display for ViolationClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationClause::ForbiddenAccess => write!(f, "forbidden"),
            ViolationClause::AccessOutsideAllowed => write!(f, "not allowed"),
            ViolationClause::MissingAccess => write!(f, "missing required access"),
        }
    }
}

/// One offending edge, always in importer -> imported order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Violation {
    pub importer: ModulePath,
    pub imported: ModulePath,
    pub clause: ViolationClause,
}

impl Violation {
    pub fn new(edge: DependencyEdge, clause: ViolationClause) -> Self {
        Self {
            importer: edge.importer,
            imported: edge.imported,
            clause,
        }
    }

    pub fn is(&self, importer: &str, imported: &str) -> bool {
        self.importer.as_str() == importer && self.imported.as_str() == imported
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.importer, self.imported, self.clause)
    }
}

/// Non-fatal observations made while evaluating a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleWarning {
    /// The object resolved to no module; the rule is trivially decided.
    EmptyObject,
    /// Subject and object share these modules.
    OverlappingOperands { modules: Vec<ModulePath> },
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleWarning::EmptyObject => write!(f, "the object matches no module"),
            RuleWarning::OverlappingOperands { modules } => {
                let names: Vec<&str> = modules.iter().map(ModulePath::as_str).collect();
                write!(f, "subject and object overlap in {}", names.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Verdict {
    pub violations: Vec<Violation>,
    pub warnings: Vec<RuleWarning>,
    /// Size of the resolved subject set.
    pub subject_modules: usize,
    /// Size of the resolved object set.
    pub object_modules: usize,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A broken rule, with every offending edge.
#[derive(Debug, Clone, Serialize)]
pub struct RuleViolation {
    pub rule: String,
    pub violations: Vec<Violation>,
}

impl RuleViolation {
    pub fn new(rule: &Rule, violations: Vec<Violation>) -> Self {
        Self {
            rule: rule.to_string(),
            violations,
        }
    }

    /// Merge several violations into one, as a diagram check reports them.
    pub fn aggregate(title: impl Into<String>, parts: Vec<RuleViolation>) -> Self {
        let mut violations: Vec<Violation> =
            parts.into_iter().flat_map(|part| part.violations).collect();
        violations.sort();
        violations.dedup();
        Self {
            rule: title.into(),
            violations,
        }
    }

    pub fn contains(&self, importer: &str, imported: &str) -> bool {
        self.violations.iter().any(|v| v.is(importer, imported))
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule violated: {}", self.rule)?;
        for violation in &self.violations {
            write!(f, "\n  - {}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for RuleViolation {}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(importer: &str, imported: &str, clause: ViolationClause) -> Violation {
        Violation::new(DependencyEdge::parse(importer, imported).unwrap(), clause)
    }

    #[test]
    fn test_violation_display() {
        let v = violation("ui.view", "core.model", ViolationClause::ForbiddenAccess);
        assert_eq!(v.to_string(), "ui.view -> core.model (forbidden)");
    }

    #[test]
    fn test_rule_violation_lists_every_edge() {
        let err = RuleViolation {
            rule: "modules [core] should not import modules [ui]".into(),
            violations: vec![
                violation("core.a", "ui.x", ViolationClause::ForbiddenAccess),
                violation("core.b", "ui.y", ViolationClause::ForbiddenAccess),
            ],
        };
        let message = err.to_string();
        assert!(message.starts_with("Rule violated: modules [core] should not import"));
        assert!(message.contains("core.a -> ui.x"));
        assert!(message.contains("core.b -> ui.y"));
        assert!(err.contains("core.b", "ui.y"));
        assert!(!err.contains("ui.y", "core.b"));
    }

    #[test]
    fn test_aggregate_sorts_and_dedups() {
        let part = |importer: &str, imported: &str| RuleViolation {
            rule: String::new(),
            violations: vec![violation(importer, imported, ViolationClause::ForbiddenAccess)],
        };
        let merged = RuleViolation::aggregate(
            "diagram",
            vec![part("b", "c"), part("a", "b"), part("b", "c")],
        );
        assert_eq!(merged.violations.len(), 2);
        assert!(merged.violations[0].is("a", "b"));
    }

    #[test]
    fn test_warning_display() {
        let warning = RuleWarning::OverlappingOperands {
            modules: vec![ModulePath::parse("a.b").unwrap()],
        };
        assert_eq!(warning.to_string(), "subject and object overlap in a.b");
    }
}
