//! Composable conformance verification for geodetic reference-system
//! implementations.
//!
//! The harness builds geodetic entities (ellipsoids, datums, reference
//! systems, coordinate operations) through an implementation's factories,
//! then compares them against authoritative reference fixtures from the GIGS
//! test series.
//!
//! ## Overview
//!
//! Every test method ends in exactly one [`Outcome`]: PASS, SKIP when the
//! implementation lacks a collaborator, does not recognize a code or
//! disclaims a capability, or FAIL when a comparison or structural check
//! fails. Composite entities are tested by nesting one test's build strategy
//! inside another, with failures attributed to the component that caused
//! them.
//!
//! ## Modules
//!
//! - [`units`] - Units of measure and conversion to canonical units
//! - [`entity`] - The entity model exposed by implementations under test
//! - [`factory`] - Collaborator traits and the [`Collaborators`] bundle
//! - [`config`] - Capability flags and per-test configuration snapshots
//! - [`fixture`] - Reference fixtures
//! - [`builder`] - Lazy, memoizing construction of the entity under test
//! - [`verifier`] - Property-by-property comparison against a fixture
//! - [`case`] - Test cases and nested composition
//! - [`harness`] - Entry point running test methods
//! - [`outcome`] - Outcomes and the run-wide reporter
//! - [`errors`] - Error types carrying component paths
//! - [`memory`] - In-memory reference collaborators

pub mod builder;
pub mod case;
pub mod config;
pub mod entity;
pub mod errors;
pub mod factory;
pub mod fixture;
pub mod harness;
pub mod memory;
pub mod outcome;
pub mod units;
pub mod verifier;

// Re-exports for convenient access to core types
pub use builder::{BuildSource, ObjectBuilder};
pub use case::TestCase;
pub use config::{Capabilities, Capability, ConfigValue, Configuration, ConfigurationConflict};
pub use entity::{Code, Entity, EntityKind, FieldValue, Identifier};
pub use errors::{ComponentPath, PropertyMismatch, SkipReason, TestError, TestResult};
pub use factory::{
    AuthorityFactory, Collaborators, FactoryError, FactoryKind, ObjectFactory, PropertyMap,
    PropertyValue, ValidationError, Validator,
};
pub use fixture::{FixtureBuilder, ReferenceFixture};
pub use harness::Harness;
pub use outcome::{Outcome, Reporter, Summary};
pub use units::{Dimension, Measure, StandardUnits, Unit, UnitConverter};
pub use verifier::{AliasPolicy, Tip, Tolerances, Verification, Verifier, VerifyOptions};

#[cfg(test)]
mod tests;
