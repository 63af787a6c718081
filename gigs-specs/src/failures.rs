//! Ledger of failures an implementation is known to have.
//!
//! ```toml
//! [[known]]
//! test = "GIGS_3003/8903"
//! reason = "angles are stored in degrees"
//!
//! [[pending]]
//! test = "GIGS_3002/7008"
//! ```
//!
//! A failing test listed under `known` or `pending` does not fail the run.
//! Skips never do.

use crate::errors::{SpecError, SpecResult};
use gigs_harness::Outcome;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedFailures {
    /// Gaps the implementation does not intend to close.
    #[serde(default)]
    pub known: Vec<FailureEntry>,
    /// Gaps with a fix in progress.
    #[serde(default)]
    pub pending: Vec<FailureEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    /// Test name, e.g. `GIGS_3003/8903`.
    pub test: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// How a failed test counts against the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureState {
    Known,
    Pending,
    /// Not in the ledger.
    Regression,
}

impl ExpectedFailures {
    /// Load from a TOML file. A missing file means no expected failures.
    pub fn load(path: &Path) -> SpecResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| SpecError::Load {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&path.display().to_string(), &content)
    }

    pub fn parse(path: &str, content: &str) -> SpecResult<Self> {
        toml::from_str(content).map_err(|e| SpecError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// The ledger entry for `test` and the list it is on.
    pub fn entry(&self, test: &str) -> Option<(FailureState, &FailureEntry)> {
        let known = self.known.iter().map(|e| (FailureState::Known, e));
        let pending = self.pending.iter().map(|e| (FailureState::Pending, e));
        known.chain(pending).find(|(_, e)| e.test == test)
    }

    /// State of a failure of `test`.
    pub fn classify(&self, test: &str) -> FailureState {
        self.entry(test)
            .map_or(FailureState::Regression, |(state, _)| state)
    }
}

/// Tallies of a suite run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessResult {
    pub total: usize,
    pub passed: usize,
    pub skipped: usize,
    /// Failures found in the ledger.
    pub expected_failures: usize,
    pub regressions: usize,
}

impl HarnessResult {
    /// Counts one outcome. Returns the failure state for failures.
    pub fn record(
        &mut self,
        test: &str,
        outcome: &Outcome,
        failures: &ExpectedFailures,
    ) -> Option<FailureState> {
        self.total += 1;
        match outcome {
            Outcome::Pass => {
                self.passed += 1;
                None
            }
            Outcome::Skip(_) => {
                self.skipped += 1;
                None
            }
            Outcome::Fail(_) => {
                let state = failures.classify(test);
                if state == FailureState::Regression {
                    self.regressions += 1;
                } else {
                    self.expected_failures += 1;
                }
                Some(state)
            }
        }
    }

    /// No regressions; expected failures and skips are allowed.
    pub fn success(&self) -> bool {
        self.regressions == 0
    }

    /// Process exit code: 1 when any regression occurred.
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.success())
    }
}
