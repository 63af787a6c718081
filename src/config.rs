//! Configuration snapshots.
//!
//! A [`Configuration`] records which optional behaviours the implementation
//! under test claims to support, plus one entry per collaborator in use. It is
//! computed once per top-level test case and copied into nested test cases,
//! which may add keys but never overwrite inherited ones.

use crate::factory::Collaborators;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Well-known capability keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    PreservesUserValues,
    StandardIdentifierSupported,
    StandardNameSupported,
    StandardAliasSupported,
    DependencyIdentificationSupported,
    DeprecatedObjectCreationSupported,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::PreservesUserValues,
        Capability::StandardIdentifierSupported,
        Capability::StandardNameSupported,
        Capability::StandardAliasSupported,
        Capability::DependencyIdentificationSupported,
        Capability::DeprecatedObjectCreationSupported,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Capability::PreservesUserValues => "preservesUserValues",
            Capability::StandardIdentifierSupported => "standardIdentifierSupported",
            Capability::StandardNameSupported => "standardNameSupported",
            Capability::StandardAliasSupported => "standardAliasSupported",
            Capability::DependencyIdentificationSupported => "dependencyIdentificationSupported",
            Capability::DeprecatedObjectCreationSupported => "deprecatedObjectCreationSupported",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Capabilities claimed by the implementation under test.
///
/// Every capability defaults to supported; an implementation disclaims the
/// behaviours it lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Capabilities {
    pub preserves_user_values: bool,
    pub standard_identifier_supported: bool,
    pub standard_name_supported: bool,
    pub standard_alias_supported: bool,
    pub dependency_identification_supported: bool,
    pub deprecated_object_creation_supported: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            preserves_user_values: true,
            standard_identifier_supported: true,
            standard_name_supported: true,
            standard_alias_supported: true,
            dependency_identification_supported: true,
            deprecated_object_creation_supported: true,
        }
    }
}

impl Capabilities {
    pub fn get(&self, capability: Capability) -> bool {
        match capability {
            Capability::PreservesUserValues => self.preserves_user_values,
            Capability::StandardIdentifierSupported => self.standard_identifier_supported,
            Capability::StandardNameSupported => self.standard_name_supported,
            Capability::StandardAliasSupported => self.standard_alias_supported,
            Capability::DependencyIdentificationSupported => {
                self.dependency_identification_supported
            }
            Capability::DeprecatedObjectCreationSupported => {
                self.deprecated_object_creation_supported
            }
        }
    }

    pub fn with(mut self, capability: Capability, supported: bool) -> Self {
        let slot = match capability {
            Capability::PreservesUserValues => &mut self.preserves_user_values,
            Capability::StandardIdentifierSupported => &mut self.standard_identifier_supported,
            Capability::StandardNameSupported => &mut self.standard_name_supported,
            Capability::StandardAliasSupported => &mut self.standard_alias_supported,
            Capability::DependencyIdentificationSupported => {
                &mut self.dependency_identification_supported
            }
            Capability::DeprecatedObjectCreationSupported => {
                &mut self.deprecated_object_creation_supported
            }
        };
        *slot = supported;
        self
    }
}

/// A value stored in a configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Flag(bool),
    /// Description of a collaborator in use.
    Collaborator(String),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Flag(b) => write!(f, "{}", b),
            ConfigValue::Collaborator(description) => write!(f, "{}", description),
        }
    }
}

/// A key was written twice to the same snapshot.
///
/// This is a test-authoring bug: two components claimed the same slot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("configuration key `{key}` written twice (already {previous})")]
pub struct ConfigurationConflict {
    pub key: String,
    pub previous: ConfigValue,
}

/// Ordered mapping from configuration key to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    entries: Vec<(String, ConfigValue)>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh copy of `parent`, ready for the child to add its own keys.
    pub fn inherit(parent: &Configuration) -> Self {
        Self {
            entries: parent.entries.clone(),
        }
    }

    /// Snapshot for a top-level test case: one flag per capability followed by
    /// one entry per collaborator in use.
    pub fn for_collaborators(
        collaborators: &Collaborators,
        capabilities: &Capabilities,
    ) -> Result<Self, ConfigurationConflict> {
        let mut configuration = Self::new();
        for &capability in Capability::ALL.iter() {
            configuration.put_flag(capability, capabilities.get(capability))?;
        }
        for (key, description) in collaborators.in_use() {
            configuration.put(key, ConfigValue::Collaborator(description))?;
        }
        Ok(configuration)
    }

    /// Adds a key. Never overwrites: a second write returns the conflict and
    /// leaves the snapshot unchanged.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        value: ConfigValue,
    ) -> Result<(), ConfigurationConflict> {
        let key = key.into();
        if let Some(previous) = self.get(&key) {
            return Err(ConfigurationConflict {
                key,
                previous: previous.clone(),
            });
        }
        self.entries.push((key, value));
        Ok(())
    }

    pub fn put_flag(
        &mut self,
        capability: Capability,
        value: bool,
    ) -> Result<(), ConfigurationConflict> {
        self.put(capability.key(), ConfigValue::Flag(value))
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    /// Capability flag, falling back to "supported" when unset.
    pub fn flag(&self, capability: Capability) -> bool {
        match self.get(capability.key()) {
            Some(ConfigValue::Flag(value)) => *value,
            _ => true,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
