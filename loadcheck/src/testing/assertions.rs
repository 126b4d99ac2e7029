//! Test assertions for validation results and run summaries.

use crate::contracts::{ValidationResult, ViolationKind};
use crate::driver::Summary;

/// Asserts that the result has no violations.
pub fn assert_contract_valid(result: &ValidationResult) {
    assert!(
        result.is_valid(),
        "Expected a valid body, got violations: {:#?}",
        result.messages()
    );
}

/// Asserts that the result has a violation of `kind` at `path`.
pub fn assert_violation(result: &ValidationResult, kind: ViolationKind, path: &str) {
    assert!(!result.is_valid(), "Expected violations, got a valid result");
    assert!(
        result.violations.iter().any(|v| v.kind == kind && v.path == path),
        "Expected {} at '{}', got: {:#?}",
        kind,
        path,
        result.messages()
    );
}

/// Asserts that a named check ran and never failed.
pub fn assert_check_passed(summary: &Summary, name: &str) {
    let check = summary
        .metrics
        .check(name)
        .unwrap_or_else(|| panic!("Check '{name}' was never recorded"));
    assert!(
        check.all_passed() && check.passes > 0,
        "Expected check '{}' to pass, got {} passes and {} fails",
        name,
        check.passes,
        check.fails
    );
}

/// Asserts that a named check failed at least once.
pub fn assert_check_failed(summary: &Summary, name: &str) {
    let check = summary
        .metrics
        .check(name)
        .unwrap_or_else(|| panic!("Check '{name}' was never recorded"));
    assert!(
        check.fails > 0,
        "Expected check '{}' to fail, got {} passes",
        name,
        check.passes
    );
}
