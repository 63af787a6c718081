//! Reference fixtures: the expected properties of one test case.

use crate::entity::{Code, EntityKind, FieldValue, Identifier};
use crate::factory::{PropertyMap, PropertyValue, ALIAS_KEY, DEPRECATED_KEY, IDENTIFIERS_KEY, NAME_KEY};
use crate::units::Measure;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

fn default_authority() -> String {
    "EPSG".to_string()
}

/// Expected properties for one logical test case.
///
/// Built once through [`ReferenceFixture::builder`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFixture {
    kind: EntityKind,
    #[serde(default = "default_authority")]
    authority: String,
    code: Code,
    name: String,
    #[serde(default)]
    aliases: BTreeSet<String>,
    #[serde(default)]
    deprecated: bool,
    /// Role (e.g. `ellipsoid`) to expected dependency name.
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    measures: BTreeMap<String, Measure>,
    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
    /// Absolute tolerance overriding the verifier's default for every measure,
    /// in the canonical unit of each measure's dimension.
    #[serde(default)]
    tolerance: Option<f64>,
}

impl ReferenceFixture {
    pub fn builder(kind: EntityKind, code: impl Into<Code>, name: impl Into<String>) -> FixtureBuilder {
        FixtureBuilder {
            fixture: ReferenceFixture {
                kind,
                authority: default_authority(),
                code: code.into(),
                name: name.into(),
                aliases: BTreeSet::new(),
                deprecated: false,
                dependencies: BTreeMap::new(),
                measures: BTreeMap::new(),
                fields: BTreeMap::new(),
                tolerance: None,
            },
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn identifier(&self) -> Identifier {
        Identifier::new(self.authority.clone(), &self.code)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn dependencies(&self) -> &BTreeMap<String, String> {
        &self.dependencies
    }

    pub fn measures(&self) -> &BTreeMap<String, Measure> {
        &self.measures
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn tolerance(&self) -> Option<f64> {
        self.tolerance
    }

    /// Property map handed to the factory's creation call.
    ///
    /// Dependencies are not part of the map: they travel as already-built
    /// components.
    pub fn properties(&self) -> PropertyMap {
        let mut properties = PropertyMap::new();
        properties.insert(
            IDENTIFIERS_KEY.to_string(),
            PropertyValue::Identifier(self.identifier()),
        );
        properties.insert(NAME_KEY.to_string(), PropertyValue::Text(self.name.clone()));
        if !self.aliases.is_empty() {
            properties.insert(
                ALIAS_KEY.to_string(),
                PropertyValue::Aliases(self.aliases.iter().cloned().collect()),
            );
        }
        if self.deprecated {
            properties.insert(
                DEPRECATED_KEY.to_string(),
                PropertyValue::Scalar(FieldValue::Flag(true)),
            );
        }
        for (field, measure) in &self.measures {
            properties.insert(field.clone(), PropertyValue::Measure(*measure));
        }
        for (field, value) in &self.fields {
            properties.insert(field.clone(), PropertyValue::Scalar(value.clone()));
        }
        properties
    }
}

/// Builder for [`ReferenceFixture`].
#[derive(Debug, Clone)]
pub struct FixtureBuilder {
    fixture: ReferenceFixture,
}

impl FixtureBuilder {
    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.fixture.authority = authority.into();
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.fixture.aliases.insert(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fixture.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.fixture.deprecated = deprecated;
        self
    }

    /// Expected name of the dependency found under `role`.
    pub fn dependency(mut self, role: impl Into<String>, name: impl Into<String>) -> Self {
        self.fixture.dependencies.insert(role.into(), name.into());
        self
    }

    pub fn measure(mut self, field: impl Into<String>, measure: Measure) -> Self {
        self.fixture.measures.insert(field.into(), measure);
        self
    }

    pub fn field(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fixture.fields.insert(field.into(), value.into());
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.fixture.tolerance = Some(tolerance);
        self
    }

    pub fn build(self) -> ReferenceFixture {
        self.fixture
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;

    fn paris() -> ReferenceFixture {
        ReferenceFixture::builder(EntityKind::PrimeMeridian, 8903, "Paris")
            .alias("Paris meridian")
            .measure("greenwichLongitude", Measure::new(2.5969213, Unit::Grad))
            .build()
    }

    #[test]
    fn test_identifier_defaults_to_epsg() {
        assert_eq!(paris().identifier().to_string(), "EPSG:8903");
    }

    #[test]
    fn test_properties() {
        let properties = paris().properties();

        assert_eq!(
            properties.get(NAME_KEY),
            Some(&PropertyValue::Text("Paris".to_string()))
        );
        assert_eq!(
            properties.get(ALIAS_KEY),
            Some(&PropertyValue::Aliases(vec!["Paris meridian".to_string()]))
        );
        assert_eq!(
            properties.get("greenwichLongitude"),
            Some(&PropertyValue::Measure(Measure::new(2.5969213, Unit::Grad)))
        );
        assert!(properties.get(DEPRECATED_KEY).is_none());
    }

    #[test]
    fn test_aliases_ignore_order_and_duplicates() {
        let a = ReferenceFixture::builder(EntityKind::GeodeticDatum, 6326, "World Geodetic System 1984")
            .aliases(vec!["WGS 84", "WGS84"])
            .build();
        let b = ReferenceFixture::builder(EntityKind::GeodeticDatum, 6326, "World Geodetic System 1984")
            .aliases(vec!["WGS84", "WGS 84", "WGS84"])
            .build();
        assert_eq!(a, b);
        assert_eq!(a.aliases().len(), 2);
    }
}
