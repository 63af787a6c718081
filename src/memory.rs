//! In-memory reference collaborators.
//!
//! [`MemoryFactory`] behaves like a perfectly conforming implementation: it
//! echoes the supplied properties back as a [`MemoryEntity`], keeps values in
//! the units they were given (unless told to normalize them) and exposes
//! components under their role names.
//! Useful as a baseline when wiring a new suite, and as the stub collaborator
//! in the harness's own tests.

use crate::entity::{Code, Entity, EntityKind, FieldValue, Identifier};
use crate::factory::{
    AuthorityFactory, FactoryError, ObjectFactory, PropertyMap, PropertyValue, ValidationError,
    Validator, ALIAS_KEY, IDENTIFIERS_KEY, NAME_KEY,
};
use crate::units::{Measure, StandardUnits, UnitConverter};
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MemoryEntity {
    kind: EntityKind,
    identifiers: Vec<Identifier>,
    name: Option<String>,
    aliases: Vec<String>,
    dependencies: Vec<(String, Arc<dyn Entity>)>,
    measures: BTreeMap<String, Measure>,
    fields: BTreeMap<String, FieldValue>,
}

impl MemoryEntity {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            identifiers: Vec::new(),
            name: None,
            aliases: Vec::new(),
            dependencies: Vec::new(),
            measures: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Entity carrying exactly the given properties and components.
    ///
    /// Operation components are exposed as `step 1`, `step 2`...; every other
    /// component under its kind's [`role`](EntityKind::role).
    pub fn from_properties(
        kind: EntityKind,
        properties: &PropertyMap,
        components: &[Arc<dyn Entity>],
    ) -> Self {
        let mut entity = Self::new(kind);
        for (key, value) in properties {
            match (key.as_str(), value) {
                (IDENTIFIERS_KEY, PropertyValue::Identifier(id)) => {
                    entity.identifiers.push(id.clone())
                }
                (NAME_KEY, PropertyValue::Text(name)) => entity.name = Some(name.clone()),
                (ALIAS_KEY, PropertyValue::Aliases(aliases)) => {
                    entity.aliases.extend(aliases.iter().cloned())
                }
                (_, PropertyValue::Measure(measure)) => {
                    entity.measures.insert(key.clone(), *measure);
                }
                (_, PropertyValue::Scalar(value)) => {
                    entity.fields.insert(key.clone(), value.clone());
                }
                _ => {}
            }
        }

        let mut step = 0;
        for component in components {
            let role = if kind == EntityKind::ConcatenatedOperation && component.kind().is_operation() {
                step += 1;
                format!("step {}", step)
            } else {
                component.kind().role().to_string()
            };
            entity.dependencies.push((role, Arc::clone(component)));
        }
        entity
    }

    pub fn identifier(mut self, authority: &str, code: impl ToString) -> Self {
        self.identifiers.push(Identifier::new(authority, code));
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_dependency(mut self, role: impl Into<String>, entity: Arc<dyn Entity>) -> Self {
        self.dependencies.push((role.into(), entity));
        self
    }

    pub fn with_measure(mut self, field: impl Into<String>, measure: Measure) -> Self {
        self.measures.insert(field.into(), measure);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }
}

impl Entity for MemoryEntity {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn identifiers(&self) -> Vec<Identifier> {
        self.identifiers.clone()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn aliases(&self) -> Vec<String> {
        self.aliases.clone()
    }

    fn dependency(&self, role: &str) -> Option<&dyn Entity> {
        self.dependencies
            .iter()
            .find(|(r, _)| r == role)
            .map(|(_, entity)| entity.as_ref())
    }

    fn measure(&self, field: &str) -> Option<Measure> {
        self.measures.get(field).copied()
    }

    fn field(&self, field: &str) -> Option<FieldValue> {
        self.fields.get(field).cloned()
    }
}

/// Object factory building [`MemoryEntity`] values from the supplied
/// properties.
#[derive(Debug, Default)]
pub struct MemoryFactory {
    rejected: BTreeSet<String>,
    normalize: bool,
    calls: Cell<usize>,
}

impl MemoryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports `code` as unsupported instead of creating it.
    pub fn reject(mut self, code: impl ToString) -> Self {
        self.rejected.insert(code.to_string());
        self
    }

    /// Stores measures in their canonical unit instead of the supplied one.
    pub fn normalizing(mut self) -> Self {
        self.normalize = true;
        self
    }

    /// Number of creation calls received.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ObjectFactory for MemoryFactory {
    fn create(
        &self,
        kind: EntityKind,
        properties: &PropertyMap,
        components: &[Arc<dyn Entity>],
    ) -> Result<Arc<dyn Entity>, FactoryError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(PropertyValue::Identifier(id)) = properties.get(IDENTIFIERS_KEY) {
            if self.rejected.contains(&id.code) {
                return Err(FactoryError::unsupported(
                    id.clone(),
                    format!("{} is not in this implementation's register", kind),
                ));
            }
        }
        if !self.normalize {
            return Ok(Arc::new(MemoryEntity::from_properties(kind, properties, components)));
        }

        let mut normalized = PropertyMap::new();
        for (key, value) in properties {
            let value = match value {
                PropertyValue::Measure(measure) => {
                    let canonical = StandardUnits.to_canonical(*measure).ok_or_else(|| {
                        FactoryError::creation(kind, format!("cannot normalize {}", measure))
                    })?;
                    PropertyValue::Measure(Measure::new(canonical, measure.unit.canonical()))
                }
                other => other.clone(),
            };
            normalized.insert(key.clone(), value);
        }
        Ok(Arc::new(MemoryEntity::from_properties(kind, &normalized, components)))
    }
}

/// Authority factory backed by a table of predefined entities.
#[derive(Debug, Default)]
pub struct MemoryAuthority {
    entries: BTreeMap<(EntityKind, Code), Arc<dyn Entity>>,
}

impl MemoryAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, kind: EntityKind, code: impl Into<Code>, entity: Arc<dyn Entity>) -> Self {
        self.entries.insert((kind, code.into()), entity);
        self
    }
}

impl AuthorityFactory for MemoryAuthority {
    fn lookup(&self, kind: EntityKind, code: &Code) -> Result<Arc<dyn Entity>, FactoryError> {
        self.entries
            .get(&(kind, code.clone()))
            .cloned()
            .ok_or_else(|| FactoryError::NoSuchCode { code: code.clone() })
    }
}

/// Validator accepting every entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, _entity: &dyn Entity) -> Result<(), ValidationError> {
        Ok(())
    }
}
