//! Component diagrams as architecture rules.
//!
//! A diagram lists modules and the arrows between them. [`DiagramRule`]
//! turns it into plain [`Rule`]s: every arrow is a required (or, with
//! [`DiagramRule::should_only`], the only allowed) dependency, and every
//! missing arrow between two diagram modules is a forbidden one.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{CheckError, ConfigurationError};
use crate::graph::DependencyGraph;
use crate::module::{ModulePath, ModulePathError};
use crate::rule::{Rule, RuleViolation, Verdict};

pub mod parser;

pub use parser::{DiagramParseError, ParsedDependencies, PumlParser};

/// Qualifies diagram names with a base module: `model` becomes `app.model`.
#[derive(Debug, Clone)]
pub struct ModulePrefixer {
    prefix: String,
}

impl ModulePrefixer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn apply(&self, name: &str) -> String {
        format!("{}.{}", self.prefix, name)
    }

    pub fn prefix(&self, parsed: &ParsedDependencies) -> ParsedDependencies {
        ParsedDependencies::new(
            parsed.all_modules.iter().map(|m| self.apply(m)).collect(),
            parsed
                .dependencies
                .iter()
                .map(|(importer, targets)| {
                    (
                        self.apply(importer),
                        targets.iter().map(|t| self.apply(t)).collect(),
                    )
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct DiagramRule {
    origin: String,
    parsed: ParsedDependencies,
    base_module: Option<ModulePath>,
    should_only: bool,
}

impl DiagramRule {
    pub fn from_file(path: &Path) -> Result<Self, DiagramParseError> {
        let parsed = PumlParser::new().parse(path)?;
        Ok(Self::from_parsed(path.display().to_string(), parsed))
    }

    pub fn from_parsed(origin: impl Into<String>, parsed: ParsedDependencies) -> Self {
        Self {
            origin: origin.into(),
            parsed,
            base_module: None,
            should_only: false,
        }
    }

    /// Diagram names are relative to `module`.
    pub fn base_module(mut self, module: &str) -> Result<Self, ModulePathError> {
        self.base_module = Some(ModulePath::parse(module)?);
        Ok(self)
    }

    /// Arrows list the only dependencies a module may have.
    pub fn should_only(mut self) -> Self {
        self.should_only = true;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Parsed dependencies with the base module applied.
    pub fn dependencies(&self) -> ParsedDependencies {
        match &self.base_module {
            Some(base) => ModulePrefixer::new(base.as_str()).prefix(&self.parsed),
            None => self.parsed.clone(),
        }
    }

    pub fn rules(&self) -> Result<Vec<Rule>, ConfigurationError> {
        let deps = self.dependencies();
        let mut rules = Vec::new();

        for module in &deps.all_modules {
            let mut allowed = deps.dependencies_of(module);
            allowed.remove(module);

            if !allowed.is_empty() {
                let access = Rule::modules_that().are_named([module])?;
                let access = if self.should_only {
                    access.should_only()
                } else {
                    access.should()
                };
                rules.push(access.import_modules_that().are_named(&allowed)?);
                if self.should_only {
                    continue;
                }
            }

            let forbidden: BTreeSet<&String> = deps
                .all_modules
                .iter()
                .filter(|other| *other != module && !allowed.contains(*other))
                .collect();
            if !forbidden.is_empty() {
                rules.push(
                    Rule::modules_that()
                        .are_named([module])?
                        .should_not()
                        .import_modules_that()
                        .are_named(forbidden)?,
                );
            }
        }

        tracing::debug!(diagram = %self.origin, rules = rules.len(), "converted diagram");
        Ok(rules)
    }

    /// Every generated rule with its verdict.
    pub fn evaluate(&self, graph: &DependencyGraph) -> Result<Vec<(Rule, Verdict)>, ConfigurationError> {
        self.rules()?
            .into_iter()
            .map(|rule| {
                let verdict = rule.evaluate(graph)?;
                Ok((rule, verdict))
            })
            .collect()
    }

    /// Assert the whole diagram; all broken arrows come back as one violation.
    pub fn assert_applies(&self, graph: &DependencyGraph) -> Result<(), CheckError> {
        let failures: Vec<RuleViolation> = self
            .evaluate(graph)?
            .into_iter()
            .filter(|(_, verdict)| !verdict.passed())
            .map(|(rule, verdict)| RuleViolation::new(&rule, verdict.violations))
            .collect();
        if failures.is_empty() {
            return Ok(());
        }
        Err(CheckError::Violation(RuleViolation::aggregate(
            self.to_string(),
            failures,
        )))
    }
}

impl FromStr for DiagramRule {
    type Err = DiagramParseError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let parsed = PumlParser::new().parse_str(content)?;
        Ok(Self::from_parsed("<inline>", parsed))
    }
}

impl fmt::Display for DiagramRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "diagram {}", self.origin)?;
        if let Some(base) = &self.base_module {
            write!(f, " (base module {})", base)?;
        }
        Ok(())
    }
}
