// tests/plan_shapes.rs

mod common;
use crate::common::init_tracing;

use std::collections::HashSet;
use std::error::Error;

use stepdag::{Plan, Planner, StepRegistry};
use stepdag_test_utils::TestBed;

type TestResult = Result<(), Box<dyn Error>>;

fn plan_names(plan: &Plan) -> Vec<Vec<String>> {
    plan.sets()
        .iter()
        .map(|set| set.iter().map(|c| c.name().to_string()).collect())
        .collect()
}

fn planner_for(registry: StepRegistry) -> stepdag::Result<Planner> {
    Planner::builder()
        .step_namespaces(["demo"])
        .enumerator(registry)
        .build()
}

/// A -> B -> C via productions `a` and `b`.
fn linear_chain(bed: &TestBed) -> StepRegistry {
    let mut registry = StepRegistry::new();
    registry.register(bed.class("demo::A").produces("a").build());
    registry.register(bed.class("demo::B").depends_on("a").produces("b").build());
    registry.register(bed.class("demo::C").depends_on("b").build());
    registry
}

/// A fans out to B and C, which join at D.
fn diamond(bed: &TestBed) -> StepRegistry {
    let mut registry = StepRegistry::new();
    registry.register(bed.class("demo::A").produces("a").build());
    registry.register(bed.class("demo::B").depends_on("a").produces("b").build());
    registry.register(bed.class("demo::C").depends_on("a").produces("c").build());
    registry.register(
        bed.class("demo::D")
            .depends_on("b")
            .depends_on("c")
            .build(),
    );
    registry
}

#[test]
fn linear_chain_plans_one_step_per_set() -> TestResult {
    init_tracing();
    let bed = TestBed::new();

    let planner = planner_for(linear_chain(&bed))?;
    let plan = planner.plan(&["demo::C".to_string()])?;

    assert_eq!(
        plan_names(&plan),
        vec![vec!["demo::A"], vec!["demo::B"], vec!["demo::C"]]
    );

    Ok(())
}

#[test]
fn diamond_plans_middle_steps_together() -> TestResult {
    init_tracing();
    let bed = TestBed::new();

    let planner = planner_for(diamond(&bed))?;
    let plan = planner.plan(&["demo::D".to_string()])?;

    assert_eq!(
        plan_names(&plan),
        vec![
            vec!["demo::A".to_string()],
            vec!["demo::B".to_string(), "demo::C".to_string()],
            vec!["demo::D".to_string()],
        ]
    );

    Ok(())
}

#[test]
fn shared_class_is_emitted_once_at_its_highest_layer() -> TestResult {
    init_tracing();
    let bed = TestBed::new();

    // D consumes both `a` (layer 0) and `b` (layer 1), and B is also a
    // final step of its own.
    let mut registry = StepRegistry::new();
    registry.register(bed.class("demo::A").produces("a").build());
    registry.register(bed.class("demo::B").depends_on("a").produces("b").build());
    registry.register(
        bed.class("demo::D")
            .depends_on("a")
            .depends_on("b")
            .build(),
    );

    let planner = planner_for(registry)?;
    let plan = planner.plan(&["demo::B".to_string(), "demo::D".to_string()])?;

    assert_eq!(
        plan_names(&plan),
        vec![vec!["demo::A"], vec!["demo::B"], vec!["demo::D"]]
    );

    Ok(())
}

#[test]
fn no_class_appears_in_two_sets() -> TestResult {
    init_tracing();
    let bed = TestBed::new();

    let planner = planner_for(diamond(&bed))?;
    let plan = planner.plan(&["demo::D".to_string(), "demo::B".to_string()])?;

    let mut seen = HashSet::new();
    for set in plan.sets() {
        for class in set {
            assert!(
                seen.insert(class.name().to_string()),
                "{} appears in more than one set",
                class.name()
            );
        }
    }
    assert_eq!(seen.len(), plan.step_count());

    Ok(())
}

#[test]
fn sets_are_sorted_by_class_name() -> TestResult {
    init_tracing();
    let bed = TestBed::new();

    let mut registry = StepRegistry::new();
    for name in ["demo::Zed", "demo::Mid", "demo::Ack"] {
        let production = name.to_lowercase().replace("::", "_");
        registry.register(bed.class(name).produces(&production).build());
    }

    let planner = planner_for(registry)?;
    let plan = planner.plan(&[
        "demo::Zed".to_string(),
        "demo::Mid".to_string(),
        "demo::Ack".to_string(),
    ])?;

    assert_eq!(
        plan_names(&plan),
        vec![vec!["demo::Ack", "demo::Mid", "demo::Zed"]]
    );

    Ok(())
}

#[test]
fn dependencies_always_land_in_earlier_sets() -> TestResult {
    init_tracing();
    let bed = TestBed::new();

    let planner = planner_for(diamond(&bed))?;
    let plan = planner.plan(&["demo::D".to_string()])?;

    // Map each production to the set index of its producer.
    let mut produced_at = std::collections::HashMap::new();
    for (index, set) in plan.sets().iter().enumerate() {
        for class in set {
            for production in class.productions() {
                produced_at.insert(production.name.clone(), index);
            }
        }
    }

    for (index, set) in plan.sets().iter().enumerate() {
        for class in set {
            for dep in class.dependencies() {
                let producer_set = produced_at[&dep.name];
                assert!(
                    producer_set < index,
                    "dependency '{}' of {} produced in set {} but consumed in set {}",
                    dep.name,
                    class.name(),
                    producer_set,
                    index
                );
            }
        }
    }

    Ok(())
}
