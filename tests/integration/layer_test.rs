//! Layer rules on the layered fixture.

use strata::error::{CheckError, ConfigurationError};
use strata::layer::LayeredArchitecture;
use strata::rule::Rule;

use crate::support::fixtures::layered_graph;

fn architecture() -> LayeredArchitecture {
    let mut arch = LayeredArchitecture::new();
    arch.layer("Core")
        .unwrap()
        .containing_modules(["app.core"])
        .unwrap();
    arch.layer("UI")
        .unwrap()
        .containing_modules(["app.ui"])
        .unwrap();
    arch.layer("Util")
        .unwrap()
        .having_modules_matching(r"^app\.util$")
        .unwrap();
    arch
}

#[test]
fn test_core_should_not_access_ui() {
    let graph = layered_graph();
    let layers = architecture().mapping().unwrap();

    let rule = Rule::layers_that(&layers)
        .are_named(["Core"])
        .unwrap()
        .should_not()
        .access_layers_that()
        .are_named(["UI"])
        .unwrap();
    rule.assert_applies(&graph).unwrap();
}

#[test]
fn test_ui_should_not_access_core_fails() {
    let graph = layered_graph();
    let layers = architecture().mapping().unwrap();

    let rule = Rule::layers_that(&layers)
        .are_named(["UI"])
        .unwrap()
        .should_not()
        .access_layers_that()
        .are_named(["Core"])
        .unwrap();
    let err = rule.assert_applies(&graph).unwrap_err();
    let violation = err.violation().unwrap();
    assert_eq!(violation.violations.len(), 1);
    assert!(violation.contains("app.ui.view", "app.core.model"));
}

#[test]
fn test_util_accessed_only_by_known_layers() {
    let graph = layered_graph();
    let layers = architecture().mapping().unwrap();

    let rule = Rule::layers_that(&layers)
        .are_named(["Util"])
        .unwrap()
        .should_only()
        .be_accessed_by_layers_that()
        .are_named(["Core", "UI"])
        .unwrap();
    rule.assert_applies(&graph).unwrap();
}

#[test]
fn test_core_should_only_access_util() {
    let graph = layered_graph();
    let layers = architecture().mapping().unwrap();

    let rule = Rule::layers_that(&layers)
        .are_named(["Core"])
        .unwrap()
        .should_only()
        .access_layers_that()
        .are_named(["Util"])
        .unwrap();
    rule.assert_applies(&graph).unwrap();
}

#[test]
fn test_module_in_two_layers_rejected() {
    let mut arch = LayeredArchitecture::new();
    arch.layer("Core")
        .unwrap()
        .containing_modules(["app.core"])
        .unwrap();
    let err = arch
        .layer("Domain")
        .unwrap()
        .containing_modules(["app.core"])
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::ModulesAlreadyAssigned { .. }));
}

#[test]
fn test_pattern_overlap_detected_on_evaluation() {
    let graph = layered_graph();
    let mut arch = LayeredArchitecture::new();
    arch.layer("Core")
        .unwrap()
        .containing_modules(["app.core"])
        .unwrap();
    arch.layer("Models")
        .unwrap()
        .having_modules_matching(r".*\.model$")
        .unwrap();
    let layers = arch.mapping().unwrap();

    let rule = Rule::layers_that(&layers)
        .are_named(["Core"])
        .unwrap()
        .should_not()
        .access_any_layer();
    let err = rule.assert_applies(&graph).unwrap_err();
    assert!(matches!(
        err,
        CheckError::Configuration(ConfigurationError::OverlappingLayers { .. })
    ));
}
