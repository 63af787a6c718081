//! Rich formatting for failed tests and run summaries.

use crate::failures::HarnessResult;
use crate::runner::SuiteReport;
use gigs_harness::{Capability, TestError};
use std::fmt::Write;

/// Format a failed test with its component path and a hint where one helps.
pub fn format_failure(file: &str, test: &str, error: &TestError) -> String {
    let mut output = String::new();

    // Header
    let _ = writeln!(output, "\nFAIL: {}:{}", file, test);
    let _ = writeln!(output);

    if let Some(path) = error.path().filter(|p| !p.is_root()) {
        let _ = writeln!(output, "  in component: {}", path);
    }

    match error {
        TestError::PropertyMismatch(mismatch) => {
            let _ = writeln!(output, "  {} mismatch on {}", mismatch.property, mismatch.entity);
            let _ = writeln!(output, "    expected `{}`", mismatch.expected);
            let _ = writeln!(output, "    found    `{}`", mismatch.actual);
        }
        TestError::StructuralViolation { message, .. } => {
            let _ = writeln!(output, "  structural violation: {}", message);
        }
        TestError::ConfigurationConflict(conflict) => {
            let _ = writeln!(output, "  harness misconfiguration: {}", conflict);
        }
        TestError::Unexpected { message, .. } => {
            let _ = writeln!(output, "  unexpected failure: {}", message);
        }
        TestError::Skipped(reason) => {
            // Not a failure; rendered for completeness.
            let _ = writeln!(output, "  skipped: {}", reason);
        }
    }

    if let Some(hint) = generate_hint(error) {
        let _ = writeln!(output);
        let _ = writeln!(output, "  hint: {}", hint);
    }

    output
}

/// Format a summary of a suite run.
pub fn format_summary(name: &str, report: &SuiteReport) -> String {
    let mut output = String::new();
    let result: &HarnessResult = &report.result;

    let status = if result.success() { "PASS" } else { "FAIL" };

    let _ = writeln!(output, "\n{}: {}", status, name);
    let _ = writeln!(output, "  {}", report.summary());
    let _ = writeln!(
        output,
        "  {} expected failures, {} regressions",
        result.expected_failures, result.regressions
    );

    let unsupported = report.reporter.unsupported_codes();
    if !unsupported.is_empty() {
        let _ = writeln!(output, "  unsupported codes:");
        for (test, identifier) in unsupported {
            let _ = writeln!(output, "    {} ({})", identifier, test);
        }
    }

    let regressions: Vec<_> = report.regressions().collect();
    if !regressions.is_empty() {
        let _ = writeln!(output, "  regressions:");
        for case in regressions {
            let _ = writeln!(output, "    {}:{}", case.file, case.test);
        }
    }

    output
}

fn generate_hint(error: &TestError) -> Option<String> {
    match error {
        TestError::PropertyMismatch(mismatch) => match mismatch.capability {
            Some(Capability::PreservesUserValues) => Some(format!(
                "the value was not kept in the unit it was supplied in - set {} = false if the implementation normalizes units",
                Capability::PreservesUserValues
            )),
            Some(capability) => Some(format!(
                "set {} = false if the implementation does not support this check",
                capability
            )),
            None if mismatch.property == "name" && mismatch.expected.eq_ignore_ascii_case(&mismatch.actual) => {
                Some("names are compared case-sensitively".to_string())
            }
            None => None,
        },
        TestError::ConfigurationConflict(_) => {
            Some("two components wrote the same configuration key; this is a bug in the test".to_string())
        }
        _ => None,
    }
}
