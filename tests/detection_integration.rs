//! Integration tests for the full detection pipeline.
//!
//! These tests validate that the detection engine correctly identifies
//! violations when run against the testdata fixtures.

use std::collections::BTreeSet;
use std::path::PathBuf;

use wpfcheck::config::{self, Config};
use wpfcheck::detect::{DetectionResult, Finding, Rule, Runner, Severity};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Run detection over a single fixture with the default config.
fn run_fixture(name: &str) -> DetectionResult {
    let testdata = testdata_path();
    Runner::new(&testdata)
        .run(&[testdata.join(name)])
        .expect("detection should succeed")
}

/// All `.cs` fixtures in testdata.
fn fixture_files() -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(testdata_path())
        .expect("should read testdata dir")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "cs").unwrap_or(false))
        .collect();
    files.sort();
    files
}

fn of_rule(result: &DetectionResult, rule: Rule) -> Vec<&Finding> {
    result.findings.iter().filter(|f| f.rule == rule).collect()
}

#[test]
fn test_conventional_property_has_no_findings() {
    let result = run_fixture("DocumentedControl.cs");

    assert_eq!(result.scanned, 1);
    assert!(
        result.findings.is_empty(),
        "expected no findings, got {:?}",
        result.findings
    );
}

#[test]
fn test_mismatched_default_value() {
    let result = run_fixture("MismatchedDefault.cs");

    assert_eq!(result.findings.len(), 1, "{:?}", result.findings);
    let finding = &result.findings[0];
    assert_eq!(finding.rule, Rule::DefaultValueType);
    assert_eq!(finding.severity, Severity::Error);
    assert_eq!(finding.file, "MismatchedDefault.cs");
    assert_eq!((finding.span.start_line, finding.span.start_col), (12, 34));
    assert_eq!(finding.message, "Default value for 'BarProperty' must be of type int");

    let metadata = finding.context.metadata.as_ref().expect("metadata context");
    assert_eq!(metadata.default_value.as_ref().unwrap().text, "\"text\"");
}

#[test]
fn test_side_effect_in_attached_setter() {
    let result = run_fixture("AttachedSideEffect.cs");

    assert_eq!(result.findings.len(), 1, "{:?}", result.findings);
    let finding = &result.findings[0];
    assert_eq!(finding.rule, Rule::AccessorSideEffect);
    assert_eq!((finding.span.start_line, finding.span.start_col), (16, 13));
    assert_eq!(finding.arguments, vec!["SetBar".to_string()]);
}

#[test]
fn test_set_current_value_outside_constructor_only() {
    let result = run_fixture("ResettableControl.cs");

    let found = of_rule(&result, Rule::UseSetCurrentValue);
    assert_eq!(found.len(), 1, "{:?}", result.findings);
    assert_eq!(found[0].line(), 27);
    assert_eq!(found[0].message, "Use SetCurrentValue(BarProperty, 5)");

    // The finding carries what a fix needs to rewrite the assignment.
    let context = &found[0].context;
    assert_eq!(context.backing.as_ref().unwrap().name, "BarProperty");
    assert!(context.registration.is_some());
    assert!(context.accessors.is_some());
}

#[test]
fn test_auto_property_does_not_notify() {
    let result = run_fixture("MainViewModel.cs");

    assert_eq!(result.findings.len(), 1, "{:?}", result.findings);
    let finding = &result.findings[0];
    assert_eq!(finding.rule, Rule::PropertyDoesNotNotify);
    assert_eq!((finding.span.start_line, finding.span.start_col), (12, 23));
    assert_eq!(finding.message, "Property 'Name' must notify when value changes");
}

#[test]
fn test_read_only_key_without_public_property() {
    let result = run_fixture("ReadOnlyControl.cs");

    let found = of_rule(&result, Rule::ReadOnlyMissingPublicProperty);
    assert_eq!(found.len(), 1, "{:?}", result.findings);
    assert_eq!(found[0].line(), 8);
    assert_eq!(found[0].arguments[0], "IsBusyPropertyKey");
}

#[test]
fn test_detection_is_idempotent() {
    let testdata = testdata_path();
    let files = fixture_files();
    let runner = Runner::new(&testdata);

    let key = |result: &DetectionResult| -> BTreeSet<(Rule, String, usize, usize, String)> {
        result
            .findings
            .iter()
            .map(|f| (f.rule, f.file.clone(), f.span.start_byte, f.span.end_byte, f.message.clone()))
            .collect()
    };

    let first = runner.run(&files).expect("first run");
    let second = runner.run(&files).expect("second run");

    assert_eq!(first.scanned, files.len());
    assert!(!first.findings.is_empty());
    assert_eq!(key(&first), key(&second));
}

#[test]
fn test_fixture_config_is_applied() {
    let testdata = testdata_path();
    let config = Config::parse_file(testdata.join("wpfcheck.yaml")).expect("should parse config");
    config::validate(&config).expect("config should be valid");

    let result = Runner::new(&testdata)
        .with_config(config)
        .run(&fixture_files())
        .expect("detection should succeed");

    assert!(of_rule(&result, Rule::MissingDocumentation).is_empty());

    let notify = of_rule(&result, Rule::PropertyDoesNotNotify);
    assert!(!notify.is_empty());
    assert!(notify.iter().all(|f| f.severity == Severity::Info));

    assert!(result
        .findings
        .iter()
        .all(|f| f.file != "DocumentedControl.cs"));
}

#[test]
fn test_findings_are_sorted_by_file_and_line() {
    let testdata = testdata_path();
    let result = Runner::new(&testdata)
        .run(&fixture_files())
        .expect("detection should succeed");

    let order: Vec<(String, usize)> = result
        .findings
        .iter()
        .map(|f| (f.file.clone(), f.line()))
        .collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}
