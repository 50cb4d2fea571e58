use std::collections::{HashMap, HashSet};

use proptest::prelude::*;

use stagehand::dag::{resolve, DagGraph};

// Strategy for arbitrary acyclic task graphs: task N may only depend on
// tasks 0..N, so acyclicity holds by construction. Raw indices are
// sanitized with a modulo so the graph stays valid under shrinking.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(move |raw_deps| {
            raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    let mut deps: HashSet<usize> = HashSet::new();
                    for d in potential {
                        if i > 0 {
                            deps.insert(d % i);
                        }
                    }
                    let mut deps: Vec<String> =
                        deps.into_iter().map(|d| format!("task_{d}")).collect();
                    deps.sort();
                    (format!("task_{i}"), deps)
                })
                .collect()
        })
    })
}

proptest! {
    #[test]
    fn acyclic_graphs_always_resolve(nodes in dag_strategy(12)) {
        let graph = DagGraph::from_nodes(nodes.clone());
        let plan = resolve(&graph).unwrap();

        // Every task appears in exactly one stage.
        let mut stage_of: HashMap<&str, usize> = HashMap::new();
        for (idx, stage) in plan.stages().iter().enumerate() {
            for task in stage {
                prop_assert!(
                    stage_of.insert(task.as_str(), idx).is_none(),
                    "task {task} appeared twice"
                );
            }
        }
        prop_assert_eq!(stage_of.len(), nodes.len());

        // Every predecessor lands in a strictly earlier stage.
        for (name, deps) in &nodes {
            for dep in deps {
                prop_assert!(
                    stage_of[dep.as_str()] < stage_of[name.as_str()],
                    "{} must precede {}", dep, name
                );
            }
        }
    }

    #[test]
    fn plans_are_deterministic(nodes in dag_strategy(10)) {
        let graph = DagGraph::from_nodes(nodes);
        let first = resolve(&graph).unwrap();
        let second = resolve(&graph).unwrap();
        prop_assert_eq!(first, second);
    }
}
