// tests/catalog_discovery.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;

use stepdag::{ProductionMap, StepCatalog, StepClass, StepRegistry, StepdagError};
use stepdag_test_utils::TestBed;

type TestResult = Result<(), Box<dyn Error>>;

fn discover(namespaces: &[&str], registry: &StepRegistry) -> stepdag::Result<StepCatalog> {
    let namespaces: Vec<String> = namespaces.iter().map(|s| s.to_string()).collect();
    StepCatalog::discover(&namespaces, registry)
}

fn names(catalog: &StepCatalog) -> Vec<&str> {
    catalog.classes().iter().map(|c| c.name()).collect()
}

#[test]
fn catalog_orders_by_namespace_then_class_name() -> TestResult {
    init_tracing();
    let bed = TestBed::new();

    let mut registry = StepRegistry::new();
    registry.register(bed.class("demo::beta::Zeta").produces("z").build());
    registry.register(bed.class("demo::beta::Alpha").produces("a").build());
    registry.register(bed.class("demo::alpha::Mid").produces("m").build());

    // `demo::beta` is declared first, so its classes precede `demo::alpha`'s
    // despite sorting later alphabetically.
    let catalog = discover(&["demo::beta", "demo::alpha"], &registry)?;
    assert_eq!(
        names(&catalog),
        vec!["demo::beta::Alpha", "demo::beta::Zeta", "demo::alpha::Mid"]
    );

    Ok(())
}

#[test]
fn first_declared_namespace_wins_for_duplicate_productions() -> TestResult {
    init_tracing();
    let bed = TestBed::new();

    let mut registry = StepRegistry::new();
    registry.register(bed.class("my::test::MakeFoo").produces("foo").build());
    registry.register(bed.class("my::prod::MakeFoo").produces("foo").build());

    let catalog = discover(&["my::prod", "my::test"], &registry)?;
    let map = ProductionMap::new(catalog.classes());

    let producer = map.producer_of("foo").expect("foo must have a producer");
    assert_eq!(producer.name(), "my::prod::MakeFoo");

    Ok(())
}

#[test]
fn consumers_resolve_to_the_precedent_namespace() -> TestResult {
    init_tracing();
    let bed = TestBed::new();

    let mut registry = StepRegistry::new();
    registry.register(bed.class("my::prod::MakeFoo").produces("foo").build());
    registry.register(bed.class("my::test::MakeFoo").produces("foo").build());
    registry.register(
        bed.class("my::prod::UseFoo")
            .depends_on("foo")
            .produces("bar")
            .build(),
    );

    let planner = stepdag::Planner::builder()
        .step_namespaces(["my::prod", "my::test"])
        .enumerator(registry)
        .build()?;

    let plan = planner.plan(&["my::prod::UseFoo".to_string()])?;
    let first_set: Vec<&str> = plan.sets()[0].iter().map(|c| c.name()).collect();
    assert_eq!(first_set, vec!["my::prod::MakeFoo"]);

    Ok(())
}

#[test]
fn markers_are_discarded() -> TestResult {
    init_tracing();
    let bed = TestBed::new();

    let mut registry = StepRegistry::new();
    registry.register_marker("demo::steps::StepRole");
    registry.register(bed.class("demo::steps::Real").produces("r").build());

    let catalog = discover(&["demo::steps"], &registry)?;
    assert_eq!(names(&catalog), vec!["demo::steps::Real"]);

    Ok(())
}

#[test]
fn duplicate_production_in_one_class_is_malformed() {
    init_tracing();
    let bed = TestBed::new();

    let mut registry = StepRegistry::new();
    registry.register(
        bed.class("demo::steps::Doubled")
            .produces("x")
            .produces("x")
            .build(),
    );

    let err = discover(&["demo::steps"], &registry).unwrap_err();
    match err {
        StepdagError::CatalogMalformed { class, reason, .. } => {
            assert_eq!(class, "demo::steps::Doubled");
            assert!(reason.contains("declared twice"), "reason: {reason}");
        }
        other => panic!("expected CatalogMalformed, got {other:?}"),
    }
}

#[test]
fn class_without_constructor_is_malformed() {
    init_tracing();

    let mut registry = StepRegistry::new();
    registry.register(StepClass::builder("demo::steps::Abstract").production("p").build());

    let err = discover(&["demo::steps"], &registry).unwrap_err();
    match err {
        StepdagError::CatalogMalformed { class, reason, .. } => {
            assert_eq!(class, "demo::steps::Abstract");
            assert!(reason.contains("no constructor"), "reason: {reason}");
        }
        other => panic!("expected CatalogMalformed, got {other:?}"),
    }
}

#[test]
fn overlapping_namespaces_keep_one_copy() -> TestResult {
    init_tracing();
    let bed = TestBed::new();

    let mut registry = StepRegistry::new();
    registry.register(bed.class("demo::steps::A").produces("a").build());

    let catalog = discover(&["demo", "demo::steps"], &registry)?;
    assert_eq!(names(&catalog), vec!["demo::steps::A"]);

    Ok(())
}
