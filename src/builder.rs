//! Lazy, memoizing construction of the entity under test.
//!
//! An [`ObjectBuilder`] calls the factory collaborator at most once per
//! fixture. Repeated [`get`](ObjectBuilder::get) calls return the cached
//! entity; [`reset`](ObjectBuilder::reset) accepts a new fixture and forces
//! the next `get` to build again.

use crate::config::{Capability, Configuration};
use crate::entity::Entity;
use crate::errors::{ComponentPath, SkipReason, TestError, TestResult};
use crate::factory::{Collaborators, FactoryError, AUTHORITY_KEY};
use crate::fixture::ReferenceFixture;
use log::{debug, info, warn};
use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where the entity comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildSource {
    /// Created from the fixture's properties through an object factory.
    UserDefined,
    /// Looked up by code in the authority factory.
    Authority,
}

impl Default for BuildSource {
    fn default() -> Self {
        BuildSource::UserDefined
    }
}

#[derive(Debug, Default)]
pub struct ObjectBuilder {
    fixture: Option<ReferenceFixture>,
    source: BuildSource,
    components: Vec<Arc<dyn Entity>>,
    cached: OnceCell<Arc<dyn Entity>>,
    creations: usize,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixture(fixture: ReferenceFixture, source: BuildSource) -> Self {
        Self {
            fixture: Some(fixture),
            source,
            ..Self::default()
        }
    }

    pub fn fixture(&self) -> Option<&ReferenceFixture> {
        self.fixture.as_ref()
    }

    pub fn source(&self) -> BuildSource {
        self.source
    }

    pub fn components(&self) -> &[Arc<dyn Entity>] {
        &self.components
    }

    /// Replaces the fixture and drops the cached entity and components.
    pub fn reset(&mut self, fixture: ReferenceFixture, source: BuildSource) {
        self.fixture = Some(fixture);
        self.source = source;
        self.components.clear();
        self.cached.take();
    }

    /// Adds a component passed to the creation call. Invalidates the cache.
    pub fn add_component(&mut self, component: Arc<dyn Entity>) {
        self.components.push(component);
        self.cached.take();
    }

    pub fn cached(&self) -> Option<&Arc<dyn Entity>> {
        self.cached.get()
    }

    /// Number of factory or authority calls made by this builder. Skips
    /// decided before the call are not counted.
    pub fn creations(&self) -> usize {
        self.creations
    }

    /// Returns the entity, building it on first access.
    pub fn get(
        &mut self,
        collaborators: &Collaborators,
        configuration: &Configuration,
    ) -> TestResult<Arc<dyn Entity>> {
        let ObjectBuilder {
            fixture,
            source,
            components,
            cached,
            creations,
        } = self;
        let components: &[Arc<dyn Entity>] = components;
        let fixture = fixture
            .as_ref()
            .ok_or_else(|| TestError::unexpected("no reference fixture was set before building"))?;

        if cached.get().is_some() {
            debug!("reusing cached {} {}", fixture.kind(), fixture.identifier());
        }
        let entity = cached.get_or_try_init(|| {
            create(fixture, *source, components, collaborators, configuration, creations)
        })?;
        Ok(Arc::clone(entity))
    }
}

fn create(
    fixture: &ReferenceFixture,
    source: BuildSource,
    components: &[Arc<dyn Entity>],
    collaborators: &Collaborators,
    configuration: &Configuration,
    creations: &mut usize,
) -> TestResult<Arc<dyn Entity>> {
    let result = match source {
        BuildSource::UserDefined => {
            let kind = fixture.kind().factory();
            let factory = collaborators
                .factory(kind)
                .ok_or_else(|| absent(fixture, kind.config_key()))?;
            check_deprecated(fixture, configuration)?;
            debug!(
                "creating {} {} with {} component(s)",
                fixture.kind(),
                fixture.identifier(),
                components.len()
            );
            *creations += 1;
            factory.create(fixture.kind(), &fixture.properties(), components)
        }
        BuildSource::Authority => {
            let authority = collaborators
                .authority()
                .ok_or_else(|| absent(fixture, AUTHORITY_KEY))?;
            check_deprecated(fixture, configuration)?;
            debug!("looking up {} {}", fixture.kind(), fixture.identifier());
            *creations += 1;
            authority.lookup(fixture.kind(), fixture.code())
        }
    };

    result.map_err(|error| creation_error(fixture, error))
}

fn absent(fixture: &ReferenceFixture, collaborator: &'static str) -> SkipReason {
    info!("no {} configured, skipping {}", collaborator, fixture.identifier());
    SkipReason::AbsentCollaborator {
        path: ComponentPath::root(),
        collaborator,
    }
}

/// Runs after the presence check so an absent collaborator is reported first.
fn check_deprecated(fixture: &ReferenceFixture, configuration: &Configuration) -> TestResult<()> {
    if fixture.is_deprecated() && !configuration.flag(Capability::DeprecatedObjectCreationSupported) {
        info!("{} is deprecated and deprecated objects are not supported", fixture.identifier());
        return Err(TestError::Skipped(SkipReason::CapabilityDisabled {
            path: ComponentPath::root(),
            capability: Capability::DeprecatedObjectCreationSupported,
        }));
    }
    Ok(())
}

/// Unsupported codes caught right after the creation call become skips;
/// every other factory error is a failure.
fn creation_error(fixture: &ReferenceFixture, error: FactoryError) -> TestError {
    if error.is_unsupported() {
        warn!("{} reported as unsupported: {}", fixture.identifier(), error);
        TestError::Skipped(SkipReason::UnsupportedCode {
            path: ComponentPath::root(),
            identifier: fixture.identifier(),
            message: error.to_string(),
        })
    } else {
        TestError::unexpected(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Capabilities;
    use crate::entity::EntityKind;
    use crate::factory::{FactoryKind, ObjectFactory};
    use crate::memory::{AcceptAll, MemoryAuthority, MemoryEntity, MemoryFactory};

    fn wgs84() -> ReferenceFixture {
        ReferenceFixture::builder(EntityKind::GeodeticDatum, 6326, "World Geodetic System 1984")
            .alias("WGS 84")
            .build()
    }

    fn setup(factory: Arc<MemoryFactory>) -> (Collaborators, Configuration) {
        let collaborators =
            Collaborators::new(Arc::new(AcceptAll)).with_factory(FactoryKind::Datum, factory);
        let configuration =
            Configuration::for_collaborators(&collaborators, &Capabilities::default()).unwrap();
        (collaborators, configuration)
    }

    #[test]
    fn test_get_builds_once() {
        let factory = Arc::new(MemoryFactory::new());
        let (collaborators, configuration) = setup(Arc::clone(&factory));
        let mut builder = ObjectBuilder::with_fixture(wgs84(), BuildSource::UserDefined);

        let first = builder.get(&collaborators, &configuration).unwrap();
        let second = builder.get(&collaborators, &configuration).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builder.creations(), 1);
        assert_eq!(factory.calls(), 1);
    }

    #[test]
    fn test_reset_forces_rebuild() {
        let factory = Arc::new(MemoryFactory::new());
        let (collaborators, configuration) = setup(Arc::clone(&factory));
        let mut builder = ObjectBuilder::with_fixture(wgs84(), BuildSource::UserDefined);
        let first = builder.get(&collaborators, &configuration).unwrap();

        let etrs89 = ReferenceFixture::builder(
            EntityKind::GeodeticDatum,
            6258,
            "European Terrestrial Reference System 1989",
        )
        .build();
        builder.reset(etrs89, BuildSource::UserDefined);
        assert!(builder.cached().is_none());

        let second = builder.get(&collaborators, &configuration).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.name(), Some("European Terrestrial Reference System 1989"));
        assert_eq!(factory.calls(), 2);
    }

    #[test]
    fn test_absent_factory_skips_without_calling() {
        let collaborators = Collaborators::new(Arc::new(AcceptAll));
        let configuration =
            Configuration::for_collaborators(&collaborators, &Capabilities::default()).unwrap();
        let mut builder = ObjectBuilder::with_fixture(wgs84(), BuildSource::UserDefined);

        for _ in 0..2 {
            let error = builder.get(&collaborators, &configuration).unwrap_err();
            assert_eq!(
                error,
                TestError::Skipped(SkipReason::AbsentCollaborator {
                    path: ComponentPath::root(),
                    collaborator: "datumFactory",
                })
            );
        }
        assert!(builder.cached().is_none());
        assert_eq!(builder.creations(), 0);
    }

    #[test]
    fn test_absent_factory_reported_before_deprecation() {
        let collaborators = Collaborators::new(Arc::new(AcceptAll));
        let capabilities =
            Capabilities::default().with(Capability::DeprecatedObjectCreationSupported, false);
        let configuration = Configuration::for_collaborators(&collaborators, &capabilities).unwrap();
        let fixture = ReferenceFixture::builder(EntityKind::GeodeticDatum, 6322, "World Geodetic System 1972")
            .deprecated(true)
            .build();
        let mut builder = ObjectBuilder::with_fixture(fixture, BuildSource::UserDefined);

        match builder.get(&collaborators, &configuration) {
            Err(TestError::Skipped(SkipReason::AbsentCollaborator { collaborator, .. })) => {
                assert_eq!(collaborator, "datumFactory")
            }
            other => panic!("expected an absent datum factory, got {:?}", other),
        }
    }

    #[test]
    fn test_unsupported_code_becomes_skip() {
        let factory = Arc::new(MemoryFactory::new().reject(6326));
        let (collaborators, configuration) = setup(factory);
        let mut builder = ObjectBuilder::with_fixture(wgs84(), BuildSource::UserDefined);

        match builder.get(&collaborators, &configuration) {
            Err(TestError::Skipped(SkipReason::UnsupportedCode { identifier, .. })) => {
                assert_eq!(identifier.to_string(), "EPSG:6326");
            }
            other => panic!("expected unsupported-code skip, got {:?}", other),
        }
    }

    #[test]
    fn test_deprecated_fixture_skips_when_disclaimed() {
        let factory = Arc::new(MemoryFactory::new());
        let collaborators = Collaborators::new(Arc::new(AcceptAll))
            .with_factory(FactoryKind::Datum, Arc::clone(&factory) as Arc<dyn ObjectFactory>);
        let capabilities =
            Capabilities::default().with(Capability::DeprecatedObjectCreationSupported, false);
        let configuration = Configuration::for_collaborators(&collaborators, &capabilities).unwrap();
        let fixture = ReferenceFixture::builder(EntityKind::GeodeticDatum, 6322, "World Geodetic System 1972")
            .deprecated(true)
            .build();
        let mut builder = ObjectBuilder::with_fixture(fixture, BuildSource::UserDefined);

        let error = builder.get(&collaborators, &configuration).unwrap_err();
        assert_eq!(
            error,
            TestError::Skipped(SkipReason::CapabilityDisabled {
                path: ComponentPath::root(),
                capability: Capability::DeprecatedObjectCreationSupported,
            })
        );
        assert_eq!(factory.calls(), 0);
        assert_eq!(builder.creations(), 0);
    }

    #[test]
    fn test_authority_lookup() {
        let authority = MemoryAuthority::new().register(
            EntityKind::GeodeticDatum,
            6326,
            Arc::new(
                MemoryEntity::new(EntityKind::GeodeticDatum)
                    .identifier("EPSG", 6326)
                    .named("World Geodetic System 1984"),
            ),
        );
        let collaborators = Collaborators::new(Arc::new(AcceptAll)).with_authority(Arc::new(authority));
        let configuration =
            Configuration::for_collaborators(&collaborators, &Capabilities::default()).unwrap();

        let mut builder = ObjectBuilder::with_fixture(wgs84(), BuildSource::Authority);
        let entity = builder.get(&collaborators, &configuration).unwrap();
        assert_eq!(entity.name(), Some("World Geodetic System 1984"));

        builder.reset(
            ReferenceFixture::builder(EntityKind::GeodeticDatum, 9999, "Unknown").build(),
            BuildSource::Authority,
        );
        assert!(builder.get(&collaborators, &configuration).unwrap_err().is_skip());
    }

    #[test]
    fn test_missing_fixture_is_a_failure() {
        let (collaborators, configuration) = setup(Arc::new(MemoryFactory::new()));
        let mut builder = ObjectBuilder::new();
        let error = builder.get(&collaborators, &configuration).unwrap_err();
        assert!(!error.is_skip());
    }
}
