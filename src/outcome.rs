//! Per-test outcomes and the run-wide reporter.

use crate::entity::Identifier;
use crate::errors::{SkipReason, TestError, TestResult};
use log::{info, warn};
use std::fmt;

/// Terminal outcome of one test method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every applicable assertion held.
    Pass,
    /// The test could not meaningfully run against this implementation.
    Skip(SkipReason),
    /// An assertion failed or an unexpected error propagated.
    Fail(TestError),
}

impl Outcome {
    /// Classifies the result of a test method body.
    pub fn from_result(result: TestResult<()>) -> Self {
        match result {
            Ok(()) => Outcome::Pass,
            Err(TestError::Skipped(reason)) => Outcome::Skip(reason),
            Err(error) => Outcome::Fail(error),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Skip(_) => "SKIP",
            Outcome::Fail(_) => "FAIL",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Outcome::Skip(_))
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Outcome::Fail(_))
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Outcome::Skip(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&TestError> {
        match self {
            Outcome::Fail(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "PASS"),
            Outcome::Skip(reason) => write!(f, "SKIP ({})", reason),
            Outcome::Fail(error) => write!(f, "FAIL ({})", error),
        }
    }
}

/// Outcome tallies for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    /// Skips because a collaborator was absent.
    pub absent: usize,
    /// Skips because the implementation does not recognize the code.
    pub unsupported: usize,
    /// Skips because the implementation disclaims a capability.
    pub disabled: usize,
}

impl Summary {
    pub fn skipped(&self) -> usize {
        self.absent + self.unsupported + self.disabled
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} skipped ({} absent, {} unsupported, {} disabled)",
            self.passed,
            self.failed,
            self.skipped(),
            self.absent,
            self.unsupported,
            self.disabled
        )
    }
}

/// Collects outcomes per test and catalogues unsupported codes.
#[derive(Debug, Default)]
pub struct Reporter {
    records: Vec<(String, Outcome)>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, test: impl Into<String>, outcome: Outcome) {
        let test = test.into();
        match &outcome {
            Outcome::Pass => info!("{}: PASS", test),
            Outcome::Skip(reason) => info!("{}: SKIP {}", test, reason),
            Outcome::Fail(error) => warn!("{}: FAIL {}", test, error),
        }
        self.records.push((test, outcome));
    }

    pub fn records(&self) -> &[(String, Outcome)] {
        &self.records
    }

    pub fn outcome(&self, test: &str) -> Option<&Outcome> {
        self.records
            .iter()
            .find(|(name, _)| name == test)
            .map(|(_, outcome)| outcome)
    }

    /// Codes the implementation reported as unsupported, with the test that
    /// hit them.
    pub fn unsupported_codes(&self) -> Vec<(&str, &Identifier)> {
        self.records
            .iter()
            .filter_map(|(test, outcome)| match outcome {
                Outcome::Skip(SkipReason::UnsupportedCode { identifier, .. }) => {
                    Some((test.as_str(), identifier))
                }
                _ => None,
            })
            .collect()
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for (_, outcome) in &self.records {
            match outcome {
                Outcome::Pass => summary.passed += 1,
                Outcome::Fail(_) => summary.failed += 1,
                Outcome::Skip(SkipReason::AbsentCollaborator { .. }) => summary.absent += 1,
                Outcome::Skip(SkipReason::UnsupportedCode { .. }) => summary.unsupported += 1,
                Outcome::Skip(SkipReason::CapabilityDisabled { .. }) => summary.disabled += 1,
            }
        }
        summary
    }
}
