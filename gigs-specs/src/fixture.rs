//! Fixture files: GIGS test cases described in TOML.
//!
//! ```toml
//! title = "GIGS 3002: geodetic datums"
//!
//! [[case]]
//! test = "GIGS_3002/6326"
//! kind = "geodetic-datum"
//! code = 6326
//! name = "World Geodetic System 1984"
//! aliases = ["WGS 84"]
//! components = [7030]
//! dependencies = { ellipsoid = "WGS 84" }
//! ```
//!
//! `components` (or `steps`) lists codes of other cases in the same file.
//! They are built first, as nested test cases, and passed to the creation
//! call of the case that lists them.

use crate::errors::{SpecError, SpecResult};
use gigs_harness::{BuildSource, Code, EntityKind, ReferenceFixture};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One test method described in a fixture file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecCase {
    /// Test name, e.g. `GIGS_3002/6326`.
    pub test: String,
    #[serde(default)]
    pub source: BuildSource,
    /// Codes of cases built as components, in order.
    #[serde(default, alias = "components")]
    pub steps: Vec<Code>,
    #[serde(flatten)]
    pub fixture: ReferenceFixture,
}

impl SpecCase {
    /// Label of the nested test case building the component at `index`.
    ///
    /// Steps of a concatenated operation are numbered from 1; other
    /// components are labelled by their role.
    pub fn component_label(&self, index: usize, component: &SpecCase) -> String {
        if self.fixture.kind() == EntityKind::ConcatenatedOperation {
            format!("step {}", index + 1)
        } else {
            component.fixture.kind().role().to_string()
        }
    }
}

/// A parsed fixture file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "case")]
    pub cases: Vec<SpecCase>,
}

impl FixtureFile {
    /// Parses and validates a fixture file. `path` is only used in errors.
    pub fn parse(path: &str, content: &str) -> SpecResult<Self> {
        let file: FixtureFile = toml::from_str(content).map_err(|e| SpecError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        file.validate()?;
        Ok(file)
    }

    pub fn case(&self, test: &str) -> Option<&SpecCase> {
        self.cases.iter().find(|c| c.test == test)
    }

    pub fn case_by_code(&self, code: &Code) -> Option<&SpecCase> {
        self.cases.iter().find(|c| c.fixture.code() == code)
    }

    /// Test names are unique and every component code resolves.
    fn validate(&self) -> SpecResult<()> {
        let mut seen = BTreeSet::new();
        for case in &self.cases {
            if !seen.insert(case.test.as_str()) {
                return Err(SpecError::Reference {
                    test: case.test.clone(),
                    message: "test name is defined twice".to_string(),
                });
            }
            for code in &case.steps {
                if self.case_by_code(code).is_none() {
                    return Err(SpecError::Reference {
                        test: case.test.clone(),
                        message: format!("no case in this file has code {}", code),
                    });
                }
            }
        }
        Ok(())
    }
}
