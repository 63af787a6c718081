//! Test cases and nested composition.
//!
//! A [`TestCase`] ties one [`ObjectBuilder`] to one configuration snapshot
//! and the shared collaborators. Composite entities are tested by nesting:
//! [`TestCase::nested`] runs another test's build strategy on a child case
//! that inherits a copy of the parent's snapshot, and hands the child's entity
//! back to the parent as a component.
//!
//! ```
//! use gigs_harness::{
//!     Capabilities, Collaborators, Entity, EntityKind, Harness, ReferenceFixture, TestCase,
//!     TestResult,
//! };
//! use gigs_harness::memory::{AcceptAll, MemoryFactory};
//! use std::sync::Arc;
//!
//! fn transformation(case: &mut TestCase) -> TestResult<()> {
//!     case.set_fixture(
//!         ReferenceFixture::builder(EntityKind::Transformation, 61763, "GIGS geog3D CRS X to geog3D CRS A").build(),
//!     );
//!     Ok(())
//! }
//!
//! let collaborators = Collaborators::new(Arc::new(AcceptAll))
//!     .with_all_factories(Arc::new(MemoryFactory::new()));
//! let harness = Harness::new(collaborators, Capabilities::default());
//!
//! let outcome = harness.run("GIGS_3208", |case| {
//!     let step = case.nested("step 1", transformation)?;
//!     assert_eq!(step.name(), Some("GIGS geog3D CRS X to geog3D CRS A"));
//!     case.verify_children()
//! });
//! assert!(outcome.is_pass());
//! ```

use crate::builder::{BuildSource, ObjectBuilder};
use crate::config::{Capabilities, ConfigValue, Configuration};
use crate::entity::Entity;
use crate::errors::{TestError, TestResult};
use crate::factory::Collaborators;
use crate::fixture::ReferenceFixture;
use crate::verifier::{Tip, Verifier, VerifyOptions};
use log::debug;
use std::sync::Arc;

#[derive(Debug)]
pub struct TestCase {
    label: String,
    collaborators: Arc<Collaborators>,
    configuration: Configuration,
    builder: ObjectBuilder,
    verifier: Verifier,
    children: Vec<TestCase>,
    /// False for nested children: they build but do not assert on their own.
    assertions_enabled: bool,
    identification: bool,
    tips: Vec<Tip>,
}

impl TestCase {
    /// A top-level test case. The configuration snapshot is computed here,
    /// once.
    pub fn new(
        label: impl Into<String>,
        collaborators: Arc<Collaborators>,
        capabilities: &Capabilities,
    ) -> TestResult<Self> {
        let configuration = Configuration::for_collaborators(&collaborators, capabilities)?;
        let verifier = Verifier::from_collaborators(&collaborators);
        Ok(Self {
            label: label.into(),
            collaborators,
            configuration,
            builder: ObjectBuilder::new(),
            verifier,
            children: Vec::new(),
            assertions_enabled: true,
            identification: true,
            tips: Vec::new(),
        })
    }

    fn child(&self, label: &str) -> Self {
        Self {
            label: label.to_string(),
            collaborators: Arc::clone(&self.collaborators),
            configuration: Configuration::inherit(&self.configuration),
            builder: ObjectBuilder::new(),
            verifier: self.verifier.clone(),
            children: Vec::new(),
            assertions_enabled: false,
            identification: true,
            tips: Vec::new(),
        }
    }

    pub fn with_verifier(mut self, verifier: Verifier) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Adds a key of this case's own. Inherited keys cannot be overwritten.
    pub fn configure(&mut self, key: impl Into<String>, value: ConfigValue) -> TestResult<()> {
        self.configuration.put(key, value)?;
        Ok(())
    }

    /// Sets the fixture of a user-defined entity, forcing a rebuild.
    pub fn set_fixture(&mut self, fixture: ReferenceFixture) {
        self.set_fixture_from(fixture, BuildSource::UserDefined);
    }

    pub fn set_fixture_from(&mut self, fixture: ReferenceFixture, source: BuildSource) {
        debug!("{}: fixture {}", self.label, fixture.identifier());
        self.builder.reset(fixture, source);
    }

    pub fn fixture(&self) -> Option<&ReferenceFixture> {
        self.builder.fixture()
    }

    /// Adds an already-built component for the creation call. Call after
    /// [`set_fixture`](Self::set_fixture), which clears components.
    pub fn add_component(&mut self, component: Arc<dyn Entity>) {
        self.builder.add_component(component);
    }

    pub fn builder(&self) -> &ObjectBuilder {
        &self.builder
    }

    /// The entity under test, built on first access.
    pub fn entity(&mut self) -> TestResult<Arc<dyn Entity>> {
        self.builder.get(&self.collaborators, &self.configuration)
    }

    /// Suppresses identifier, name and alias checks, for a component already
    /// identified by its parent.
    pub fn skip_identification(&mut self) {
        self.identification = false;
    }

    pub fn assertions_enabled(&self) -> bool {
        self.assertions_enabled
    }

    /// Checks that were downgraded to tips during verification.
    pub fn tips(&self) -> &[Tip] {
        &self.tips
    }

    /// Runs this case's own assertions. A nested child does nothing here;
    /// its parent verifies it through [`verify_children`](Self::verify_children).
    pub fn verify(&mut self) -> TestResult<()> {
        if !self.assertions_enabled {
            return Ok(());
        }
        self.check()
    }

    /// Verifies every child, in order, with its inherited snapshot.
    pub fn verify_children(&mut self) -> TestResult<()> {
        for child in &mut self.children {
            let label = child.label.clone();
            child.check().map_err(|e| e.within(&label))?;
            child.verify_children().map_err(|e| e.within(&label))?;
        }
        Ok(())
    }

    fn check(&mut self) -> TestResult<()> {
        let entity = self.entity()?;
        let fixture = self
            .builder
            .fixture()
            .ok_or_else(|| TestError::unexpected("no reference fixture was set before verifying"))?;
        let options = VerifyOptions {
            identification: self.identification,
        };
        let verification =
            self.verifier
                .verify(Some(entity.as_ref()), fixture, &self.configuration, options)?;
        self.tips.extend(verification.tips);
        Ok(())
    }

    /// Builds a component through another test's build strategy.
    ///
    /// The child inherits a copy of this case's snapshot and has its own
    /// assertion path disabled. `strategy` populates the child's fixture (and
    /// may nest further); the child's entity is then built and returned. Errors
    /// are attributed to `label`.
    pub fn nested<F>(&mut self, label: &str, strategy: F) -> TestResult<Arc<dyn Entity>>
    where
        F: FnOnce(&mut TestCase) -> TestResult<()>,
    {
        let mut child = self.child(label);
        debug!("{}: nesting {}", self.label, label);
        let entity = strategy(&mut child)
            .and_then(|()| child.entity())
            .map_err(|e| e.within(label))?;
        self.children.push(child);
        Ok(entity)
    }

    /// Like [`nested`](Self::nested), with the child's identification checks
    /// suppressed.
    pub fn nested_unidentified<F>(&mut self, label: &str, strategy: F) -> TestResult<Arc<dyn Entity>>
    where
        F: FnOnce(&mut TestCase) -> TestResult<()>,
    {
        self.nested(label, |child| {
            child.skip_identification();
            strategy(child)
        })
    }

    pub fn children(&self) -> &[TestCase] {
        &self.children
    }

    pub fn child_by_label(&self, label: &str) -> Option<&TestCase> {
        self.children.iter().find(|c| c.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Capability;
    use crate::entity::EntityKind;
    use crate::errors::SkipReason;
    use crate::factory::{
        FactoryError, FactoryKind, ObjectFactory, PropertyMap, PropertyValue, NAME_KEY,
    };
    use crate::memory::{AcceptAll, MemoryFactory};
    use crate::units::{Measure, Unit};

    fn collaborators(factory: Arc<MemoryFactory>) -> Arc<Collaborators> {
        Arc::new(Collaborators::new(Arc::new(AcceptAll)).with_all_factories(factory))
    }

    fn ellipsoid(case: &mut TestCase) -> TestResult<()> {
        case.set_fixture(ReferenceFixture::builder(EntityKind::Ellipsoid, 7030, "WGS 84").build());
        Ok(())
    }

    #[test]
    fn test_child_inherits_configuration() {
        let capabilities = Capabilities::default().with(Capability::StandardAliasSupported, false);
        let mut case =
            TestCase::new("GIGS_3002", collaborators(Arc::new(MemoryFactory::new())), &capabilities)
                .unwrap();
        case.configure("parentOnly", ConfigValue::Flag(true)).unwrap();

        case.nested("ellipsoid", |child| {
            assert_eq!(
                child.configuration().get("parentOnly"),
                Some(&ConfigValue::Flag(true))
            );
            assert!(!child.configuration().flag(Capability::StandardAliasSupported));
            assert!(!child.assertions_enabled());
            child.configure("childOnly", ConfigValue::Flag(true))?;
            ellipsoid(child)
        })
        .unwrap();

        assert!(!case.configuration().contains_key("childOnly"));
        let child = case.child_by_label("ellipsoid").unwrap();
        assert!(child.configuration().contains_key("childOnly"));
        for (key, value) in case.configuration().iter() {
            assert_eq!(child.configuration().get(key), Some(value));
        }
    }

    #[test]
    fn test_child_cannot_overwrite_inherited_key() {
        let mut case = TestCase::new(
            "GIGS_3002",
            collaborators(Arc::new(MemoryFactory::new())),
            &Capabilities::default(),
        )
        .unwrap();

        let error = case
            .nested("ellipsoid", |child| {
                child.configure(Capability::StandardNameSupported.key(), ConfigValue::Flag(false))
            })
            .unwrap_err();
        assert!(matches!(error, TestError::ConfigurationConflict(_)));
    }

    #[test]
    fn test_nested_child_does_not_assert_on_its_own() {
        let mut case = TestCase::new(
            "GIGS_3002",
            collaborators(Arc::new(MemoryFactory::new())),
            &Capabilities::default(),
        )
        .unwrap();
        case.nested("ellipsoid", ellipsoid).unwrap();

        // Only the explicit parent-driven path verifies children.
        let child = &mut case.children[0];
        assert!(child.verify().is_ok());
        assert!(case.verify_children().is_ok());
    }

    #[test]
    fn test_nested_errors_are_attributed() {
        let factory = Arc::new(MemoryFactory::new().reject(7030));
        let mut case =
            TestCase::new("GIGS_3002", collaborators(factory), &Capabilities::default()).unwrap();

        let error = case.nested("ellipsoid", ellipsoid).unwrap_err();
        match error {
            TestError::Skipped(SkipReason::UnsupportedCode { path, .. }) => {
                assert_eq!(path.to_string(), "ellipsoid");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(case.children().is_empty());
    }

    #[test]
    fn test_absent_factory_in_child() {
        let collaborators = Arc::new(
            Collaborators::new(Arc::new(AcceptAll))
                .with_factory(FactoryKind::Crs, Arc::new(MemoryFactory::new())),
        );
        let mut case = TestCase::new("GIGS_3004", collaborators, &Capabilities::default()).unwrap();

        let error = case.nested("ellipsoid", ellipsoid).unwrap_err();
        assert_eq!(
            error.to_string(),
            "skipped: ellipsoid: no datumFactory configured"
        );
    }

    /// Stores every entity under a fixed name.
    #[derive(Debug)]
    struct Renaming(MemoryFactory);

    impl ObjectFactory for Renaming {
        fn create(
            &self,
            kind: EntityKind,
            properties: &PropertyMap,
            components: &[Arc<dyn Entity>],
        ) -> Result<Arc<dyn Entity>, FactoryError> {
            let mut properties = properties.clone();
            properties.insert(NAME_KEY.to_string(), PropertyValue::Text("renamed".to_string()));
            self.0.create(kind, &properties, components)
        }
    }

    fn clarke_1866(case: &mut TestCase) -> TestResult<()> {
        case.set_fixture(
            ReferenceFixture::builder(EntityKind::Ellipsoid, 7008, "Clarke 1866")
                .measure("semiMajorAxis", Measure::new(20925832.16, Unit::UsSurveyFoot))
                .build(),
        );
        Ok(())
    }

    fn renaming_case(factory: MemoryFactory) -> TestCase {
        let collaborators = Arc::new(
            Collaborators::new(Arc::new(AcceptAll))
                .with_factory(FactoryKind::Datum, Arc::new(Renaming(factory))),
        );
        TestCase::new("GIGS_3004", collaborators, &Capabilities::default()).unwrap()
    }

    #[test]
    fn test_unidentified_child_skips_identification_only() {
        let mut identified = renaming_case(MemoryFactory::new());
        identified.nested("ellipsoid", clarke_1866).unwrap();
        let error = identified.verify_children().unwrap_err();
        assert_eq!(error.path().map(|p| p.to_string()), Some("ellipsoid".to_string()));
        assert!(error.to_string().contains("name mismatch"));

        let mut unidentified = renaming_case(MemoryFactory::new());
        let entity = unidentified.nested_unidentified("ellipsoid", clarke_1866).unwrap();
        assert_eq!(entity.name(), Some("renamed"));
        assert!(unidentified.verify_children().is_ok());

        // Measures are still compared on an unidentified child.
        let mut normalized = renaming_case(MemoryFactory::new().normalizing());
        normalized.nested_unidentified("ellipsoid", clarke_1866).unwrap();
        match normalized.verify_children().unwrap_err() {
            TestError::PropertyMismatch(mismatch) => {
                assert_eq!(mismatch.property, "semiMajorAxis (as supplied)");
                assert_eq!(mismatch.path.to_string(), "ellipsoid");
            }
            other => panic!("expected a measure mismatch, got {:?}", other),
        }
    }
}
