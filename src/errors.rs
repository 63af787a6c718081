//! Error types for the harness.
//!
//! Every error carries the [`ComponentPath`] of the nested test case it came
//! from, so a failure inside a composite entity reads `step 2: name mismatch`
//! rather than only naming the outer test.

use crate::config::{Capability, ConfigurationConflict};
use crate::entity::Identifier;
use std::fmt;
use thiserror::Error;

/// Labels of the nested test cases between the top-level test and the
/// component that produced an error, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentPath(Vec<String>);

impl ComponentPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Prepends the label of an enclosing test case.
    pub fn within(mut self, label: &str) -> Self {
        self.0.insert(0, label.to_string());
        self
    }

    /// `"step 2: "` style prefix for messages, empty at the root.
    pub fn prefix(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{}: ", self)
        }
    }
}

impl fmt::Display for ComponentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" / "))
    }
}

/// Why a test method ended in SKIP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The collaborator needed to build the entity is not configured.
    AbsentCollaborator {
        path: ComponentPath,
        collaborator: &'static str,
    },
    /// The factory does not recognize the fixture's code or definition.
    UnsupportedCode {
        path: ComponentPath,
        identifier: Identifier,
        message: String,
    },
    /// The fixture needs a capability the implementation disclaims.
    CapabilityDisabled {
        path: ComponentPath,
        capability: Capability,
    },
}

impl SkipReason {
    pub fn path(&self) -> &ComponentPath {
        match self {
            SkipReason::AbsentCollaborator { path, .. }
            | SkipReason::UnsupportedCode { path, .. }
            | SkipReason::CapabilityDisabled { path, .. } => path,
        }
    }

    fn within(self, label: &str) -> Self {
        match self {
            SkipReason::AbsentCollaborator { path, collaborator } => {
                SkipReason::AbsentCollaborator {
                    path: path.within(label),
                    collaborator,
                }
            }
            SkipReason::UnsupportedCode {
                path,
                identifier,
                message,
            } => SkipReason::UnsupportedCode {
                path: path.within(label),
                identifier,
                message,
            },
            SkipReason::CapabilityDisabled { path, capability } => {
                SkipReason::CapabilityDisabled {
                    path: path.within(label),
                    capability,
                }
            }
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AbsentCollaborator { path, collaborator } => {
                write!(f, "{}no {} configured", path.prefix(), collaborator)
            }
            SkipReason::UnsupportedCode {
                path,
                identifier,
                message,
            } => write!(f, "{}{} unsupported: {}", path.prefix(), identifier, message),
            SkipReason::CapabilityDisabled { path, capability } => {
                write!(f, "{}{} is false", path.prefix(), capability)
            }
        }
    }
}

/// An expected-vs-actual comparison that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMismatch {
    pub path: ComponentPath,
    /// Description of the entity that owns the property.
    pub entity: String,
    /// Property label, e.g. `name` or `ellipsoid name`.
    pub property: String,
    pub expected: String,
    pub actual: String,
    /// Capability flag under which the check ran, for checks that depend on
    /// more than one claim.
    pub capability: Option<Capability>,
}

impl PropertyMismatch {
    pub fn new(
        entity: impl Into<String>,
        property: impl Into<String>,
        expected: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Self {
            path: ComponentPath::root(),
            entity: entity.into(),
            property: property.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
            capability: None,
        }
    }

    pub fn under(mut self, capability: Capability) -> Self {
        self.capability = Some(capability);
        self
    }
}

impl fmt::Display for PropertyMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} mismatch on {}: expected `{}`, found `{}`",
            self.path.prefix(),
            self.property,
            self.entity,
            self.expected,
            self.actual
        )?;
        if let Some(capability) = self.capability {
            write!(f, " (checked with {} = true)", capability)?;
        }
        Ok(())
    }
}

/// Errors that end a test method.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TestError {
    /// A configuration key was written twice. Always fatal.
    #[error("harness misconfiguration: {0}")]
    ConfigurationConflict(#[from] ConfigurationConflict),

    /// The test cannot run against this implementation.
    #[error("skipped: {0}")]
    Skipped(SkipReason),

    /// The structural validator rejected the entity.
    #[error("{}structural violation: {message}", .path.prefix())]
    StructuralViolation { path: ComponentPath, message: String },

    #[error("{0}")]
    PropertyMismatch(PropertyMismatch),

    /// Anything else raised while building or validating.
    #[error("{}unexpected failure: {message}", .path.prefix())]
    Unexpected { path: ComponentPath, message: String },
}

impl TestError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        TestError::Unexpected {
            path: ComponentPath::root(),
            message: message.into(),
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        TestError::StructuralViolation {
            path: ComponentPath::root(),
            message: message.into(),
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, TestError::Skipped(_))
    }

    /// Attributes the error to the nested test case labelled `label`.
    pub fn within(self, label: &str) -> Self {
        match self {
            TestError::ConfigurationConflict(conflict) => TestError::ConfigurationConflict(conflict),
            TestError::Skipped(reason) => TestError::Skipped(reason.within(label)),
            TestError::StructuralViolation { path, message } => TestError::StructuralViolation {
                path: path.within(label),
                message,
            },
            TestError::PropertyMismatch(mut mismatch) => {
                mismatch.path = mismatch.path.within(label);
                TestError::PropertyMismatch(mismatch)
            }
            TestError::Unexpected { path, message } => TestError::Unexpected {
                path: path.within(label),
                message,
            },
        }
    }

    /// Path of the component the error is attributed to.
    pub fn path(&self) -> Option<&ComponentPath> {
        match self {
            TestError::ConfigurationConflict(_) => None,
            TestError::Skipped(reason) => Some(reason.path()),
            TestError::StructuralViolation { path, .. } | TestError::Unexpected { path, .. } => {
                Some(path)
            }
            TestError::PropertyMismatch(mismatch) => Some(&mismatch.path),
        }
    }
}

impl From<PropertyMismatch> for TestError {
    fn from(mismatch: PropertyMismatch) -> Self {
        TestError::PropertyMismatch(mismatch)
    }
}

impl From<SkipReason> for TestError {
    fn from(reason: SkipReason) -> Self {
        TestError::Skipped(reason)
    }
}

/// Result type for harness operations.
pub type TestResult<T> = Result<T, TestError>;
