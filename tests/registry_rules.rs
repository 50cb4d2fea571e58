use stagehand::errors::PipelineError;
use stagehand::registry::TaskRegistry;

const NO_DEPS: [&str; 0] = [];

#[test]
fn duplicate_name_is_rejected_and_registry_unchanged() {
    let mut registry = TaskRegistry::new();
    registry
        .register("clean", NO_DEPS, TaskRegistry::noop_body())
        .unwrap();

    let err = registry
        .register("clean", NO_DEPS, TaskRegistry::noop_body())
        .unwrap_err();
    assert!(matches!(err, PipelineError::DuplicateTask(name) if name == "clean"));

    assert_eq!(registry.len(), 1);
    assert!(registry.lookup("clean").is_ok());
}

#[test]
fn unknown_predecessor_is_rejected() {
    let mut registry = TaskRegistry::new();

    let err = registry
        .register("styles", ["clean"], TaskRegistry::noop_body())
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::UnknownDependency { task, dependency }
            if task == "styles" && dependency == "clean"
    ));

    assert!(registry.is_empty());
}

#[test]
fn self_reference_counts_as_unknown_predecessor() {
    // The task is not registered yet while its own predecessors are checked.
    let mut registry = TaskRegistry::new();
    let err = registry
        .register("a", ["a"], TaskRegistry::noop_body())
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnknownDependency { .. }));
}

#[test]
fn lookup_of_absent_task_fails() {
    let registry = TaskRegistry::new();
    let err = registry.lookup("deploy").unwrap_err();
    assert!(matches!(err, PipelineError::TaskNotFound(name) if name == "deploy"));
}

#[test]
fn iteration_preserves_registration_order() {
    let mut registry = TaskRegistry::new();
    registry
        .register("clean", NO_DEPS, TaskRegistry::noop_body())
        .unwrap();
    registry
        .register("fonts", ["clean"], TaskRegistry::noop_body())
        .unwrap();
    registry
        .register("styles", ["clean"], TaskRegistry::noop_body())
        .unwrap();

    let names: Vec<&str> = registry.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["clean", "fonts", "styles"]);
}
