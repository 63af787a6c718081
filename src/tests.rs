//! End-to-end scenarios run through [`Harness`].

use crate::memory::{AcceptAll, MemoryEntity, MemoryFactory};
use crate::*;
use std::cell::RefCell;
use std::sync::Arc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn datum_harness(factory: Arc<dyn ObjectFactory>) -> Harness {
    Harness::new(
        Collaborators::new(Arc::new(AcceptAll)).with_factory(FactoryKind::Datum, factory),
        Capabilities::default(),
    )
}

fn gigs_6326(case: &mut TestCase) -> TestResult<()> {
    case.set_fixture(
        ReferenceFixture::builder(EntityKind::GeodeticDatum, 6326, "World Geodetic System 1984")
            .alias("WGS 84")
            .build(),
    );
    case.verify()
}

/// Returns every entity under a fixed name.
#[derive(Debug)]
struct RenamingFactory(&'static str);

impl ObjectFactory for RenamingFactory {
    fn create(
        &self,
        kind: EntityKind,
        properties: &PropertyMap,
        components: &[Arc<dyn Entity>],
    ) -> Result<Arc<dyn Entity>, FactoryError> {
        let mut properties = properties.clone();
        properties.insert(
            factory::NAME_KEY.to_string(),
            PropertyValue::Text(self.0.to_string()),
        );
        Ok(Arc::new(MemoryEntity::from_properties(kind, &properties, components)))
    }
}

#[test]
fn test_wgs84_datum_passes() {
    init_logging();
    let harness = datum_harness(Arc::new(MemoryFactory::new()));
    assert_eq!(harness.run("GIGS_3002", gigs_6326), Outcome::Pass);
}

#[test]
fn test_wrong_name_fails() {
    init_logging();
    let harness = datum_harness(Arc::new(RenamingFactory("wgs84")));
    let outcome = harness.run("GIGS_3002", gigs_6326);

    let failure = outcome.failure().unwrap();
    assert!(failure.to_string().starts_with("name mismatch"));
    insta::assert_snapshot!(
        failure.to_string(),
        @"name mismatch on geodetic datum EPSG:6326: expected `World Geodetic System 1984`, found `wgs84`"
    );
}

#[test]
fn test_absent_factory_skips_regardless_of_fixture() {
    init_logging();
    let harness = Harness::new(Collaborators::new(Arc::new(AcceptAll)), Capabilities::default());

    let outcome = harness.run("GIGS_3002", gigs_6326);
    assert_eq!(
        outcome.skip_reason(),
        Some(&SkipReason::AbsentCollaborator {
            path: ComponentPath::root(),
            collaborator: "datumFactory",
        })
    );

    // Contents that would fail verification make no difference.
    let outcome = harness.run("GIGS_3002", |case| {
        case.set_fixture(ReferenceFixture::builder(EntityKind::GeodeticDatum, 0, "").build());
        case.verify()
    });
    assert!(outcome.is_skip());
}

fn gigs_61763(case: &mut TestCase) -> TestResult<()> {
    case.set_fixture(
        ReferenceFixture::builder(
            EntityKind::Transformation,
            61763,
            "GIGS geogCRS B to geogCRS A (1)",
        )
        .build(),
    );
    Ok(())
}

fn gigs_61193(case: &mut TestCase) -> TestResult<()> {
    case.set_fixture(
        ReferenceFixture::builder(
            EntityKind::Transformation,
            61193,
            "GIGS geogCRS A to WGS 84 (1)",
        )
        .build(),
    );
    Ok(())
}

fn gigs_concatenated(case: &mut TestCase) -> TestResult<()> {
    let first = case.nested("step 1", gigs_61763)?;
    let second = case.nested("step 2", gigs_61193)?;
    case.set_fixture(
        ReferenceFixture::builder(
            EntityKind::ConcatenatedOperation,
            65400,
            "GIGS geogCRS B to WGS 84 (1)",
        )
        .dependency("step 1", "GIGS geogCRS B to geogCRS A (1)")
        .dependency("step 2", "GIGS geogCRS A to WGS 84 (1)")
        .build(),
    );
    case.add_component(first);
    case.add_component(second);
    case.verify()?;
    case.verify_children()
}

fn operation_harness(factory: MemoryFactory) -> Harness {
    Harness::new(
        Collaborators::new(Arc::new(AcceptAll))
            .with_factory(FactoryKind::CoordinateOperation, Arc::new(factory)),
        Capabilities::default(),
    )
}

#[test]
fn test_concatenated_operation_passes() {
    init_logging();
    let harness = operation_harness(MemoryFactory::new());
    assert!(harness.run("GIGS_3208", gigs_concatenated).is_pass());
}

#[test]
fn test_unsupported_step_skips_the_composite() {
    init_logging();
    let harness = operation_harness(MemoryFactory::new().reject(61193));
    let outcome = harness.run("GIGS_3208", gigs_concatenated);

    match outcome.skip_reason() {
        Some(SkipReason::UnsupportedCode {
            path, identifier, ..
        }) => {
            assert_eq!(path.segments(), &["step 2".to_string()]);
            assert_eq!(identifier.to_string(), "EPSG:61193");
        }
        other => panic!("expected unsupported code in step 2, got {:?}", other),
    }
    assert!(outcome.to_string().starts_with("SKIP (step 2: EPSG:61193 unsupported"));
}

#[test]
fn test_children_see_the_parent_snapshot() {
    init_logging();
    let harness = Harness::new(
        Collaborators::new(Arc::new(AcceptAll)).with_all_factories(Arc::new(MemoryFactory::new())),
        Capabilities::default().with(Capability::StandardAliasSupported, false),
    );
    let seen = RefCell::new(Vec::new());

    let outcome = harness.run("GIGS_3208", |case| {
        case.configure("suite", ConfigValue::Collaborator("3208".to_string()))?;
        let parent: Vec<(String, ConfigValue)> = case
            .configuration()
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        case.nested("step 1", |child| {
            seen.borrow_mut().extend(
                child
                    .configuration()
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone())),
            );
            gigs_61763(child)
        })?;
        assert_eq!(*seen.borrow(), parent);
        Ok(())
    });
    assert!(outcome.is_pass());
}

#[test]
fn test_builds_are_idempotent() {
    init_logging();
    let factory = Arc::new(MemoryFactory::new());
    let harness = datum_harness(Arc::clone(&factory) as Arc<dyn ObjectFactory>);

    let outcome = harness.run("GIGS_3002", |case| {
        gigs_6326(case)?;
        let first = case.entity()?;
        let second = case.entity()?;
        assert!(Arc::ptr_eq(&first, &second));
        Ok(())
    });
    assert!(outcome.is_pass());
    assert_eq!(factory.calls(), 1);
}

#[test]
fn test_configuration_conflict_fails() {
    init_logging();
    let harness = datum_harness(Arc::new(MemoryFactory::new()));
    let outcome = harness.run("GIGS_3002", |case| {
        case.configure("datumFactory", ConfigValue::Collaborator("other".to_string()))?;
        gigs_6326(case)
    });

    match outcome.failure() {
        Some(TestError::ConfigurationConflict(conflict)) => assert_eq!(conflict.key, "datumFactory"),
        other => panic!("expected a configuration conflict, got {:?}", other),
    }
}

fn gigs_8903(case: &mut TestCase) -> TestResult<()> {
    case.set_fixture(
        ReferenceFixture::builder(EntityKind::PrimeMeridian, 8903, "Paris")
            .measure("greenwichLongitude", Measure::new(2.5969213, Unit::Grad))
            .build(),
    );
    case.verify()
}

#[test]
fn test_normalized_units_depend_on_preservation_claim() {
    init_logging();
    let collaborators = || {
        Collaborators::new(Arc::new(AcceptAll))
            .with_factory(FactoryKind::Datum, Arc::new(MemoryFactory::new().normalizing()))
    };

    let preserving = Harness::new(collaborators(), Capabilities::default());
    let outcome = preserving.run("GIGS_3003", gigs_8903);
    match outcome.failure() {
        Some(TestError::PropertyMismatch(mismatch)) => {
            assert_eq!(mismatch.property, "greenwichLongitude (as supplied)");
            assert_eq!(mismatch.capability, Some(Capability::PreservesUserValues));
        }
        other => panic!("expected a preservation mismatch, got {:?}", other),
    }

    let normalizing = Harness::new(
        collaborators(),
        Capabilities::default().with(Capability::PreservesUserValues, false),
    );
    let mut tips = Vec::new();
    let outcome = normalizing.run("GIGS_3003", |case| {
        gigs_8903(case)?;
        tips.extend(case.tips().iter().cloned());
        Ok(())
    });
    assert!(outcome.is_pass());
    assert_eq!(tips.len(), 1);
    assert_eq!(tips[0].check, "greenwichLongitude (as supplied)");
}

#[test]
fn test_reporter_over_a_run() {
    init_logging();
    let harness = operation_harness(MemoryFactory::new().reject(61193));
    let mut reporter = Reporter::new();
    reporter.record("GIGS_3208/65400", harness.run("GIGS_3208", gigs_concatenated));
    reporter.record("GIGS_3208/61763", harness.run("GIGS_3208", |case| {
        gigs_61763(case)?;
        case.verify()
    }));
    reporter.record("GIGS_3002/6326", harness.run("GIGS_3002", gigs_6326));

    let summary = reporter.summary();
    assert_eq!((summary.passed, summary.unsupported, summary.absent), (1, 1, 1));
    assert_eq!(reporter.unsupported_codes()[0].1.to_string(), "EPSG:61193");
}
