//! Rule evaluation against a dependency graph.
//!
//! Subject and object are resolved to module sets `S` and `O` first. For
//! [`Direction::Imports`] the importers are `S` and the targets `O`;
//! [`Direction::ImportedBy`] swaps the two. Only edges leaving an importer
//! are inspected, so evidence is always in true import order.
//!
//! | behavior          | fails when                                                   |
//! |-------------------|--------------------------------------------------------------|
//! | `MustNotAccess`   | an importer imports a target                                 |
//! | `MustOnlyAccess`  | an importer imports a module that is neither target nor importer |
//! | `MustAccess`      | an importer imports something, but no target                 |

use std::collections::BTreeSet;

use super::verdict::{RuleWarning, Verdict, Violation, ViolationClause};
use super::{Behavior, Direction, ObjectScope, Rule};
use crate::error::ConfigurationError;
use crate::graph::DependencyGraph;
use crate::module::ModulePath;
use crate::source::DependencyEdge;

pub struct RuleMatcher<'g> {
    graph: &'g DependencyGraph,
}

impl<'g> RuleMatcher<'g> {
    pub fn new(graph: &'g DependencyGraph) -> Self {
        Self { graph }
    }

    pub fn evaluate(&self, rule: &Rule) -> Result<Verdict, ConfigurationError> {
        self.check_layers(rule)?;

        let subject: BTreeSet<ModulePath> = rule
            .subject()
            .resolve(self.graph)?
            .into_iter()
            .filter(|module| !self.graph.is_external(module))
            .collect();
        if subject.is_empty() {
            return Err(ConfigurationError::EmptySubject(rule.to_string()));
        }

        let object = self.resolve_object(rule, &subject)?;

        let mut warnings = Vec::new();
        if object.is_empty() {
            warnings.push(RuleWarning::EmptyObject);
        }
        let shared: Vec<ModulePath> = subject.intersection(&object).cloned().collect();
        if !shared.is_empty() {
            warnings.push(RuleWarning::OverlappingOperands { modules: shared });
        }
        for warning in &warnings {
            tracing::warn!(rule = %rule, "{}", warning);
        }

        let orientation = Orientation::of(rule.direction(), &subject, &object);
        let mut violations = match rule.behavior() {
            Behavior::MustNotAccess => self.forbidden(&orientation),
            Behavior::MustOnlyAccess => self.outside_allowed(&orientation),
            Behavior::MustAccess => self.missing(&orientation),
        };
        violations.sort();
        violations.dedup();

        tracing::debug!(
            rule = %rule,
            subject = subject.len(),
            object = object.len(),
            violations = violations.len(),
            "Evaluated rule"
        );

        Ok(Verdict {
            violations,
            warnings,
            subject_modules: subject.len(),
            object_modules: object.len(),
        })
    }

    /// Layer operands are only meaningful when no module sits in two layers.
    fn check_layers(&self, rule: &Rule) -> Result<(), ConfigurationError> {
        let object = match rule.object() {
            ObjectScope::Named(operand) | ObjectScope::Except(operand) => Some(operand),
            ObjectScope::Any => None,
        };
        for operand in std::iter::once(rule.subject()).chain(object) {
            if let Some(mapping) = operand.layer_mapping() {
                mapping.check_disjoint(self.graph)?;
            }
        }
        Ok(())
    }

    fn resolve_object(
        &self,
        rule: &Rule,
        subject: &BTreeSet<ModulePath>,
    ) -> Result<BTreeSet<ModulePath>, ConfigurationError> {
        let outside_subject = || -> BTreeSet<ModulePath> {
            self.graph
                .all_modules()
                .iter()
                .filter(|module| !subject.contains(*module))
                .cloned()
                .collect()
        };
        Ok(match rule.object() {
            ObjectScope::Named(operand) => operand.resolve(self.graph)?,
            ObjectScope::Any => outside_subject(),
            ObjectScope::Except(operand) => {
                let excluded = operand.resolve(self.graph)?;
                outside_subject()
                    .into_iter()
                    .filter(|module| !excluded.contains(module))
                    .collect()
            }
        })
    }

    /// Import edges leaving `module`.
    fn outgoing(&self, module: &ModulePath) -> Vec<DependencyEdge> {
        self.graph
            .successors(module)
            .into_iter()
            .map(|imported| DependencyEdge::new(module.clone(), imported.clone()))
            .collect()
    }

    fn forbidden(&self, orientation: &Orientation<'_>) -> Vec<Violation> {
        orientation
            .importers
            .iter()
            .flat_map(|module| self.outgoing(module))
            .filter(|edge| orientation.targets.contains(&edge.imported))
            .map(|edge| Violation::new(edge, ViolationClause::ForbiddenAccess))
            .collect()
    }

    fn outside_allowed(&self, orientation: &Orientation<'_>) -> Vec<Violation> {
        orientation
            .importers
            .iter()
            .flat_map(|module| self.outgoing(module))
            .filter(|edge| {
                !orientation.targets.contains(&edge.imported)
                    && !orientation.importers.contains(&edge.imported)
            })
            .map(|edge| Violation::new(edge, ViolationClause::AccessOutsideAllowed))
            .collect()
    }

    /// Every importer with at least one import needs one landing in the
    /// targets; otherwise all of its imports are the evidence.
    fn missing(&self, orientation: &Orientation<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for module in orientation.importers {
            let edges = self.outgoing(module);
            if edges.is_empty()
                || edges
                    .iter()
                    .any(|edge| orientation.targets.contains(&edge.imported))
            {
                continue;
            }
            violations.extend(
                edges
                    .into_iter()
                    .map(|edge| Violation::new(edge, ViolationClause::MissingAccess)),
            );
        }
        violations
    }
}

/// Which side of a rule does the importing.
struct Orientation<'a> {
    importers: &'a BTreeSet<ModulePath>,
    targets: &'a BTreeSet<ModulePath>,
}

impl<'a> Orientation<'a> {
    /// `ImportedBy` reads the rule from the object's side.
    fn of(
        direction: Direction,
        subject: &'a BTreeSet<ModulePath>,
        object: &'a BTreeSet<ModulePath>,
    ) -> Self {
        match direction {
            Direction::Imports => Self {
                importers: subject,
                targets: object,
            },
            Direction::ImportedBy => Self {
                importers: object,
                targets: subject,
            },
        }
    }
}
