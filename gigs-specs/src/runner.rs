//! Runs fixture-file cases through a [`Harness`].

use crate::failures::{ExpectedFailures, FailureState, HarnessResult};
use crate::fixture::{FixtureFile, SpecCase};
use gigs_harness::{Harness, Outcome, Reporter, Summary, TestCase, TestError, TestResult};
use log::{info, warn};

/// Components nested deeper than this are treated as a cycle.
pub const MAX_COMPONENT_DEPTH: usize = 16;

/// Outcome of one case in a suite run.
#[derive(Debug, Clone)]
pub struct CaseReport {
    /// Fixture file the case came from.
    pub file: String,
    pub test: String,
    pub outcome: Outcome,
    /// Set for failures only.
    pub state: Option<FailureState>,
}

/// Everything a suite run produced.
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub cases: Vec<CaseReport>,
    pub reporter: Reporter,
    pub result: HarnessResult,
}

impl SuiteReport {
    pub fn summary(&self) -> Summary {
        self.reporter.summary()
    }

    pub fn case(&self, test: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|c| c.test == test)
    }

    pub fn regressions(&self) -> impl Iterator<Item = &CaseReport> {
        self.cases
            .iter()
            .filter(|c| c.state == Some(FailureState::Regression))
    }
}

/// Runs one case: builds its components as nested test cases, then verifies
/// the case itself and every component.
pub fn run_case(harness: &Harness, file: &FixtureFile, case: &SpecCase) -> Outcome {
    harness.run(&case.test, |test_case| {
        populate(test_case, file, case, 0)?;
        test_case.verify()?;
        test_case.verify_children()
    })
}

/// Build strategy shared by top-level and nested cases.
fn populate(
    test_case: &mut TestCase,
    file: &FixtureFile,
    case: &SpecCase,
    depth: usize,
) -> TestResult<()> {
    if depth > MAX_COMPONENT_DEPTH {
        return Err(TestError::unexpected(format!(
            "{} nests components more than {} levels deep",
            case.test, MAX_COMPONENT_DEPTH
        )));
    }

    let mut components = Vec::with_capacity(case.steps.len());
    for (index, code) in case.steps.iter().enumerate() {
        let component = file.case_by_code(code).ok_or_else(|| {
            TestError::unexpected(format!("{}: no case has code {}", case.test, code))
        })?;
        let label = case.component_label(index, component);
        let entity = test_case.nested(&label, |child| populate(child, file, component, depth + 1))?;
        components.push(entity);
    }

    test_case.set_fixture_from(case.fixture.clone(), case.source);
    for entity in components {
        test_case.add_component(entity);
    }
    Ok(())
}

/// Runs every case of a fixture file.
pub fn run_file(
    harness: &Harness,
    name: &str,
    file: &FixtureFile,
    failures: &ExpectedFailures,
    report: &mut SuiteReport,
) {
    for case in &file.cases {
        let outcome = run_case(harness, file, case);
        let state = report.result.record(&case.test, &outcome, failures);
        match (&outcome, state) {
            (Outcome::Pass, _) if failures.entry(&case.test).is_some() => {
                info!("{} now passes; remove it from expected failures", case.test);
            }
            (Outcome::Fail(error), Some(FailureState::Regression)) => {
                warn!("{}: regression in {}: {}", name, case.test, error);
            }
            _ => {}
        }
        report.reporter.record(case.test.clone(), outcome.clone());
        report.cases.push(CaseReport {
            file: name.to_string(),
            test: case.test.clone(),
            outcome,
            state,
        });
    }
}

/// Runs every case of every file, in order.
pub fn run_suite(
    harness: &Harness,
    files: &[(String, FixtureFile)],
    failures: &ExpectedFailures,
) -> SuiteReport {
    let mut report = SuiteReport::default();
    for (name, file) in files {
        run_file(harness, name, file, failures, &mut report);
    }
    info!("{}", report.summary());
    report
}
