use stagehand::dag::{resolve, resolve_target, DagGraph};
use stagehand::errors::PipelineError;
use stagehand::registry::TaskRegistry;

const NO_DEPS: [&str; 0] = [];

fn portfolio_registry() -> TaskRegistry {
    let mut registry = TaskRegistry::new();
    registry
        .register("clean", NO_DEPS, TaskRegistry::noop_body())
        .unwrap();
    registry
        .register("copy_fonts", ["clean"], TaskRegistry::noop_body())
        .unwrap();
    registry
        .register("compile_styles", ["clean"], TaskRegistry::noop_body())
        .unwrap();
    registry
        .register(
            "bundle",
            ["copy_fonts", "compile_styles"],
            TaskRegistry::noop_body(),
        )
        .unwrap();
    registry
}

#[test]
fn diamond_layers_into_three_stages() {
    let graph = DagGraph::from_registry(&portfolio_registry());
    let plan = resolve(&graph).unwrap();

    assert_eq!(
        plan.stages(),
        &[
            vec!["clean".to_string()],
            vec!["copy_fonts".to_string(), "compile_styles".to_string()],
            vec!["bundle".to_string()],
        ]
    );
}

#[test]
fn stage_membership_breaks_ties_by_registration_order() {
    let mut registry = TaskRegistry::new();
    // Independent tasks all land in stage 0, in registration order.
    registry
        .register("zeta", NO_DEPS, TaskRegistry::noop_body())
        .unwrap();
    registry
        .register("alpha", NO_DEPS, TaskRegistry::noop_body())
        .unwrap();
    registry
        .register("mid", NO_DEPS, TaskRegistry::noop_body())
        .unwrap();

    let graph = DagGraph::from_registry(&registry);
    let plan = resolve(&graph).unwrap();
    assert_eq!(plan.stages().len(), 1);
    assert_eq!(plan.stages()[0], vec!["zeta", "alpha", "mid"]);
}

#[test]
fn predecessors_always_land_in_strictly_earlier_stages() {
    let graph = DagGraph::from_registry(&portfolio_registry());
    let plan = resolve(&graph).unwrap();

    let stage_of = |name: &str| {
        plan.stages()
            .iter()
            .position(|stage| stage.iter().any(|t| t == name))
            .unwrap()
    };

    for name in graph.tasks() {
        for dep in graph.dependencies_of(name) {
            assert!(
                stage_of(dep) < stage_of(name),
                "{dep} must precede {name}"
            );
        }
    }
}

#[test]
fn every_task_appears_in_exactly_one_stage() {
    let graph = DagGraph::from_registry(&portfolio_registry());
    let plan = resolve(&graph).unwrap();

    assert_eq!(plan.task_count(), 4);
    for name in graph.tasks() {
        let occurrences = plan.tasks().filter(|t| *t == name).count();
        assert_eq!(occurrences, 1, "{name} should appear exactly once");
    }
}

#[test]
fn graph_ignores_duplicate_nodes_and_answers_absent_lookups() {
    let graph = DagGraph::from_nodes([
        ("clean".to_string(), vec![]),
        ("styles".to_string(), vec!["clean".to_string()]),
        ("styles".to_string(), vec![]),
    ]);

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.tasks().collect::<Vec<_>>(), vec!["clean", "styles"]);
    // The first declaration wins.
    assert_eq!(graph.dependencies_of("styles"), ["clean".to_string()]);
    assert!(graph.dependencies_of("deploy").is_empty());
    assert!(!graph.contains("deploy"));
}

#[test]
fn two_task_cycle_is_reported_with_both_members() {
    let graph = DagGraph::from_nodes([
        ("a".to_string(), vec!["b".to_string()]),
        ("b".to_string(), vec!["a".to_string()]),
    ]);

    let err = resolve(&graph).unwrap_err();
    match err {
        PipelineError::CycleDetected(members) => {
            assert_eq!(members, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn cycle_reporting_excludes_tasks_outside_the_cycle() {
    let graph = DagGraph::from_nodes([
        ("setup".to_string(), vec![]),
        ("a".to_string(), vec!["b".to_string(), "setup".to_string()]),
        ("b".to_string(), vec!["a".to_string()]),
    ]);

    let err = resolve(&graph).unwrap_err();
    match err {
        PipelineError::CycleDetected(members) => {
            assert_eq!(members, vec!["a".to_string(), "b".to_string()]);
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn self_loop_is_reported_without_its_dependents() {
    // "b" is stuck behind the self-loop but is not part of the cycle.
    let graph = DagGraph::from_nodes([
        ("setup".to_string(), vec![]),
        ("a".to_string(), vec!["a".to_string()]),
        ("b".to_string(), vec!["a".to_string()]),
    ]);

    let err = resolve(&graph).unwrap_err();
    match err {
        PipelineError::CycleDetected(members) => {
            assert_eq!(members, vec!["a".to_string()]);
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn resolve_target_restricts_to_the_predecessor_closure() {
    let mut registry = portfolio_registry();
    registry
        .register("deploy", ["bundle"], TaskRegistry::noop_body())
        .unwrap();
    registry
        .register("lint", NO_DEPS, TaskRegistry::noop_body())
        .unwrap();

    let graph = DagGraph::from_registry(&registry);

    let plan = resolve_target(&graph, "copy_fonts").unwrap();
    assert_eq!(
        plan.stages(),
        &[vec!["clean".to_string()], vec!["copy_fonts".to_string()]]
    );

    // The full target pulls everything upstream but not unrelated tasks.
    let plan = resolve_target(&graph, "deploy").unwrap();
    assert_eq!(plan.task_count(), 5);
    assert!(plan.tasks().all(|t| t != "lint"));
}

#[test]
fn resolve_target_of_unknown_task_fails() {
    let graph = DagGraph::from_registry(&portfolio_registry());
    let err = resolve_target(&graph, "nope").unwrap_err();
    assert!(matches!(err, PipelineError::TaskNotFound(name) if name == "nope"));
}
