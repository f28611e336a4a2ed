//! Module rules evaluated against the sample manifest.

use strata::error::{CheckError, ConfigurationError};
use strata::graph::GraphOptions;
use strata::rule::{assert_applies, Rule, RuleWarning};

use crate::support::fixtures::sample_graph;

#[test]
fn test_must_not_import_reports_every_edge() {
    let graph = sample_graph(GraphOptions::new());
    let rule = Rule::modules_that()
        .are_named(["src.moduleA"])
        .unwrap()
        .should_not()
        .import_modules_that()
        .are_named(["src.moduleB"])
        .unwrap();

    let err = assert_applies(&rule, &graph).unwrap_err();
    let violation = err.violation().unwrap();
    assert_eq!(violation.violations.len(), 1);
    assert!(violation.contains("src.moduleA.submoduleA1.submoduleA11", "src.moduleB"));
    assert!(err
        .to_string()
        .contains("src.moduleA.submoduleA1.submoduleA11 -> src.moduleB"));
}

#[test]
fn test_imported_by_reports_importer_first() {
    let graph = sample_graph(GraphOptions::new());
    let rule = Rule::modules_that()
        .are_named(["src.moduleB"])
        .unwrap()
        .should_not()
        .be_imported_by_modules_that()
        .are_named(["src.moduleA"])
        .unwrap();

    let verdict = rule.evaluate(&graph).unwrap();
    assert_eq!(verdict.violations.len(), 1);
    assert!(verdict.violations[0].is("src.moduleA.submoduleA1.submoduleA11", "src.moduleB"));
}

#[test]
fn test_must_import_satisfied_through_submodule() {
    let graph = sample_graph(GraphOptions::new());
    let rule = Rule::modules_that()
        .are_named(["src.moduleD"])
        .unwrap()
        .should()
        .import_modules_that()
        .are_named(["src.moduleA"])
        .unwrap();

    rule.assert_applies(&graph).unwrap();
}

#[test]
fn test_must_only_import_with_level_limit() {
    let graph = sample_graph(GraphOptions::new().with_level_limit(1));
    let rule = Rule::modules_that()
        .are_named(["src.moduleA"])
        .unwrap()
        .should_only()
        .import_modules_that()
        .are_named(["src.moduleC"])
        .unwrap();

    let err = rule.assert_applies(&graph).unwrap_err();
    assert!(err.violation().unwrap().contains("src.moduleA", "src.moduleB"));
}

#[test]
fn test_except_scope_excludes_named_modules() {
    let graph = sample_graph(GraphOptions::new());
    let rule = Rule::modules_that()
        .are_named(["src.moduleB"])
        .unwrap()
        .should_not()
        .import_modules_except_modules_that()
        .are_named(["src.moduleC"])
        .unwrap();

    rule.assert_applies(&graph).unwrap();
}

#[test]
fn test_subject_outside_focus_is_configuration_error() {
    let graph = sample_graph(GraphOptions::new().with_focus("src.moduleA".parse().unwrap()));
    let rule = Rule::modules_that()
        .are_named(["src.moduleD"])
        .unwrap()
        .should_not()
        .import_anything();

    let err = rule.assert_applies(&graph).unwrap_err();
    assert!(matches!(
        err,
        CheckError::Configuration(ConfigurationError::EmptySubject(_))
    ));
}

#[test]
fn test_unmatched_object_warns() {
    let graph = sample_graph(GraphOptions::new());
    let rule = Rule::modules_that()
        .are_named(["src.moduleB"])
        .unwrap()
        .should_not()
        .import_modules_that()
        .have_name_matching(r"^lib\..*")
        .unwrap();

    let verdict = rule.evaluate(&graph).unwrap();
    assert!(verdict.passed());
    assert_eq!(verdict.warnings, vec![RuleWarning::EmptyObject]);
}
