//! Harness configuration loaded from TOML.
//!
//! ```toml
//! alias-policy = "exact"
//!
//! [capabilities]
//! preservesUserValues = false
//!
//! [tolerances]
//! angular = 1e-9
//! ```

use crate::errors::{SpecError, SpecResult};
use gigs_harness::{AliasPolicy, Capabilities, Collaborators, Harness, Tolerances};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What the vendor claims about its implementation, and how strictly to
/// compare.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HarnessConfig {
    pub capabilities: Capabilities,
    pub alias_policy: AliasPolicy,
    pub tolerances: Tolerances,
}

impl HarnessConfig {
    /// Load from a TOML file. A missing file yields the defaults.
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

    pub fn harness(&self, collaborators: Collaborators) -> Harness {
        Harness::new(collaborators, self.capabilities)
            .with_alias_policy(self.alias_policy)
            .with_tolerances(self.tolerances)
    }
}
