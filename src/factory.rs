//! Collaborator contracts: the factories under test, the authority lookup and
//! the structural validator.
//!
//! The harness calls these through narrow creation contracts and never
//! implements them itself. [`Collaborators`] bundles the instances for one
//! harness run; it is built once and only read afterwards.

use crate::entity::{Code, Entity, EntityKind, FieldValue, Identifier};
use crate::units::{Measure, StandardUnits, UnitConverter};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Property key holding the entity's identifier.
pub const IDENTIFIERS_KEY: &str = "identifiers";
/// Property key holding the entity's primary name.
pub const NAME_KEY: &str = "name";
/// Property key holding the entity's aliases.
pub const ALIAS_KEY: &str = "alias";
/// Property key set when the entity is deprecated in its register.
pub const DEPRECATED_KEY: &str = "deprecated";

/// Properties handed to a creation call.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A value in a [`PropertyMap`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Identifier(Identifier),
    Text(String),
    Aliases(Vec<String>),
    Measure(Measure),
    Scalar(FieldValue),
}

/// Which factory collaborator creates a given entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FactoryKind {
    Datum,
    CoordinateSystem,
    Crs,
    CoordinateOperation,
}

impl FactoryKind {
    pub const ALL: [FactoryKind; 4] = [
        FactoryKind::Datum,
        FactoryKind::CoordinateSystem,
        FactoryKind::Crs,
        FactoryKind::CoordinateOperation,
    ];

    /// Configuration key recording this factory in a snapshot.
    pub fn config_key(self) -> &'static str {
        match self {
            FactoryKind::Datum => "datumFactory",
            FactoryKind::CoordinateSystem => "csFactory",
            FactoryKind::Crs => "crsFactory",
            FactoryKind::CoordinateOperation => "copFactory",
        }
    }
}

impl fmt::Display for FactoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.config_key())
    }
}

/// Configuration key recording the authority lookup in a snapshot.
pub const AUTHORITY_KEY: &str = "authorityFactory";
/// Configuration key recording the validator in a snapshot.
pub const VALIDATOR_KEY: &str = "validator";
/// Configuration key recording the unit converter in a snapshot.
pub const UNITS_KEY: &str = "units";

/// Errors raised by factory collaborators.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FactoryError {
    /// The code or definition is not recognized by the implementation.
    #[error("{identifier} is not supported: {message}")]
    UnsupportedCode {
        identifier: Identifier,
        message: String,
    },

    /// The authority has no object registered under the code.
    #[error("no object for code {code}")]
    NoSuchCode { code: Code },

    /// Creation failed for any other reason.
    #[error("failed to create {kind}: {message}")]
    Creation { kind: EntityKind, message: String },
}

impl FactoryError {
    pub fn unsupported(identifier: Identifier, message: impl Into<String>) -> Self {
        FactoryError::UnsupportedCode {
            identifier,
            message: message.into(),
        }
    }

    pub fn creation(kind: EntityKind, message: impl Into<String>) -> Self {
        FactoryError::Creation {
            kind,
            message: message.into(),
        }
    }

    /// Whether the error means "this code is not recognized" rather than
    /// "creation went wrong".
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            FactoryError::UnsupportedCode { .. } | FactoryError::NoSuchCode { .. }
        )
    }
}

/// Creates entities from user-supplied definitions.
pub trait ObjectFactory: fmt::Debug {
    fn create(
        &self,
        kind: EntityKind,
        properties: &PropertyMap,
        components: &[Arc<dyn Entity>],
    ) -> Result<Arc<dyn Entity>, FactoryError>;
}

/// Looks up predefined entities by code.
pub trait AuthorityFactory: fmt::Debug {
    fn lookup(&self, kind: EntityKind, code: &Code) -> Result<Arc<dyn Entity>, FactoryError>;
}

/// Rejection raised by the structural validator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Deep structural validation against the referencing data model.
pub trait Validator: fmt::Debug {
    fn validate(&self, entity: &dyn Entity) -> Result<(), ValidationError>;
}

/// The injected collaborators of one harness run.
#[derive(Debug, Clone)]
pub struct Collaborators {
    factories: BTreeMap<FactoryKind, Arc<dyn ObjectFactory>>,
    authority: Option<Arc<dyn AuthorityFactory>>,
    validator: Arc<dyn Validator>,
    units: Arc<dyn UnitConverter>,
}

impl Collaborators {
    /// Collaborators with no factories, the given validator and the standard
    /// unit converter.
    pub fn new(validator: Arc<dyn Validator>) -> Self {
        Self {
            factories: BTreeMap::new(),
            authority: None,
            validator,
            units: Arc::new(StandardUnits),
        }
    }

    pub fn with_factory(mut self, kind: FactoryKind, factory: Arc<dyn ObjectFactory>) -> Self {
        self.factories.insert(kind, factory);
        self
    }

    /// Registers the same factory for every [`FactoryKind`].
    pub fn with_all_factories(mut self, factory: Arc<dyn ObjectFactory>) -> Self {
        for &kind in FactoryKind::ALL.iter() {
            self.factories.insert(kind, Arc::clone(&factory));
        }
        self
    }

    pub fn with_authority(mut self, authority: Arc<dyn AuthorityFactory>) -> Self {
        self.authority = Some(authority);
        self
    }

    pub fn with_units(mut self, units: Arc<dyn UnitConverter>) -> Self {
        self.units = units;
        self
    }

    pub fn factory(&self, kind: FactoryKind) -> Option<&Arc<dyn ObjectFactory>> {
        self.factories.get(&kind)
    }

    pub fn authority(&self) -> Option<&Arc<dyn AuthorityFactory>> {
        self.authority.as_ref()
    }

    pub fn validator(&self) -> &Arc<dyn Validator> {
        &self.validator
    }

    pub fn units(&self) -> &Arc<dyn UnitConverter> {
        &self.units
    }

    /// Configuration entries describing each collaborator actually present.
    pub fn in_use(&self) -> Vec<(&'static str, String)> {
        let mut entries: Vec<(&'static str, String)> = self
            .factories
            .iter()
            .map(|(kind, factory)| (kind.config_key(), format!("{:?}", factory)))
            .collect();
        if let Some(authority) = &self.authority {
            entries.push((AUTHORITY_KEY, format!("{:?}", authority)));
        }
        entries.push((VALIDATOR_KEY, format!("{:?}", self.validator)));
        entries.push((UNITS_KEY, format!("{:?}", self.units)));
        entries
    }
}
