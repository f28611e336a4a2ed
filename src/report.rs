//! Aggregated results of a `check` run.

use colored::Colorize;
use serde::Serialize;

use crate::diagram::DiagramRule;
use crate::error::CheckError;
use crate::graph::DependencyGraph;
use crate::rule::{Rule, RuleViolation, RuleWarning};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed { violation: RuleViolation },
    Misconfigured { message: String },
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleOutcome {
    pub name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RuleWarning>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub imports: usize,
    pub containment: usize,
}

impl GraphSummary {
    pub fn of(graph: &DependencyGraph) -> Self {
        Self {
            nodes: graph.node_count(),
            imports: graph.import_count(),
            containment: graph.containment_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub project: String,
    /// UTC, `YYYY-MM-DDTHH:MM:SSZ`.
    pub checked_at: String,
    pub graph: GraphSummary,
    pub results: Vec<RuleOutcome>,
}

impl CheckReport {
    pub fn new(project: impl Into<String>, graph: &DependencyGraph) -> Self {
        Self {
            project: project.into(),
            checked_at: crate::utc_now_iso(),
            graph: GraphSummary::of(graph),
            results: Vec::new(),
        }
    }

    /// Evaluate `rule` and record the outcome under `name`.
    pub fn record_rule(&mut self, name: &str, rule: &Rule, graph: &DependencyGraph) {
        let (outcome, warnings) = match rule.evaluate(graph) {
            Ok(verdict) if verdict.passed() => (Outcome::Passed, verdict.warnings),
            Ok(verdict) => (
                Outcome::Failed {
                    violation: RuleViolation::new(rule, verdict.violations),
                },
                verdict.warnings,
            ),
            Err(e) => (
                Outcome::Misconfigured {
                    message: e.to_string(),
                },
                Vec::new(),
            ),
        };
        self.results.push(RuleOutcome {
            name: name.to_string(),
            outcome,
            warnings,
        });
    }

    pub fn record_diagram(&mut self, diagram: &DiagramRule, graph: &DependencyGraph) {
        let outcome = match diagram.assert_applies(graph) {
            Ok(()) => Outcome::Passed,
            Err(CheckError::Violation(violation)) => Outcome::Failed { violation },
            Err(e) => Outcome::Misconfigured {
                message: e.to_string(),
            },
        };
        self.results.push(RuleOutcome {
            name: diagram.to_string(),
            outcome,
            warnings: Vec::new(),
        });
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed { .. }))
            .count()
    }

    pub fn misconfigured_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Misconfigured { .. }))
            .count()
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_passed())
    }

    /// 0 when every rule holds, 2 if any rule could not be evaluated, else 1.
    pub fn exit_code(&self) -> i32 {
        if self.misconfigured_count() > 0 {
            2
        } else if self.failed_count() > 0 {
            1
        } else {
            0
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} misconfigured",
            self.passed_count(),
            self.failed_count(),
            self.misconfigured_count()
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable report; `color` enables ANSI colors.
    pub fn render_text(&self, color: bool) -> String {
        let paint = |symbol: &str, ok: Option<bool>| -> String {
            if !color {
                return symbol.to_string();
            }
            match ok {
                Some(true) => symbol.green().to_string(),
                Some(false) => symbol.red().to_string(),
                None => symbol.yellow().to_string(),
            }
        };

        let mut lines = vec![format!(
            "Architecture check for {} ({} modules, {} imports)",
            self.project, self.graph.nodes, self.graph.imports
        )];
        for result in &self.results {
            match &result.outcome {
                Outcome::Passed => lines.push(format!("{} {}", paint("✓", Some(true)), result.name)),
                Outcome::Failed { violation } => {
                    lines.push(format!("{} {}", paint("✗", Some(false)), result.name));
                    for v in &violation.violations {
                        lines.push(format!("    {}", v));
                    }
                }
                Outcome::Misconfigured { message } => {
                    lines.push(format!("{} {}: {}", paint("⚠", None), result.name, message))
                }
            }
            for warning in &result.warnings {
                lines.push(format!("    warning: {}", warning));
            }
        }
        lines.push(self.summary());
        lines.join("\n")
    }
}
