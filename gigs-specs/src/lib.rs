//! Fixture-file driven GIGS conformance suites.
//!
//! Test cases are described declaratively in TOML fixture files and run
//! through a [`gigs_harness::Harness`] configured with the implementation's
//! collaborators.
//!
//! ## Overview
//!
//! Each `[[case]]` table becomes one test method. Cases that list
//! `components` (or `steps`) build those components first as nested test
//! cases, so a failure or skip is attributed to the component that caused it.
//! An expected-failures file separates known gaps from regressions, and only
//! regressions make a run fail.
//!
//! ## Modules
//!
//! - [`fixture`] - Fixture file schema and validation
//! - [`loader`] - Loads fixture files from a directory tree
//! - [`config`] - Capability claims and comparison settings from TOML
//! - [`runner`] - Runs cases and suites
//! - [`failures`] - Expected failures tracking via TOML
//! - [`formatter`] - Failure and summary rendering
//! - [`errors`] - Error types for loading and parsing

pub mod config;
pub mod errors;
pub mod failures;
pub mod fixture;
pub mod formatter;
pub mod loader;
pub mod runner;

// Re-exports for convenient access to core types
pub use config::HarnessConfig;
pub use errors::{SpecError, SpecResult};
pub use failures::{ExpectedFailures, FailureEntry, FailureState, HarnessResult};
pub use fixture::{FixtureFile, SpecCase};
pub use formatter::{format_failure, format_summary};
pub use loader::{load_all_fixtures, load_fixture_file};
pub use runner::{run_case, run_file, run_suite, CaseReport, SuiteReport};
