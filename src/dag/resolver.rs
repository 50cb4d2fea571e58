// src/dag/resolver.rs

use std::collections::HashSet;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::graph::DagGraph;
use crate::errors::{PipelineError, Result};
use crate::registry::TaskName;

/// Ordered sequence of stages. Each stage is a set of tasks whose
/// predecessors are all satisfied by earlier stages, so they may run
/// concurrently. Every task appears in exactly one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    stages: Vec<Vec<TaskName>>,
}

impl ExecutionPlan {
    pub fn stages(&self) -> &[Vec<TaskName>] {
        &self.stages
    }

    pub fn task_count(&self) -> usize {
        self.stages.iter().map(|s| s.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// All task names in stage order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().flatten().map(|s| s.as_str())
    }
}

/// Layer the full graph into an execution plan.
///
/// Standard topological layering: a task enters stage `k` once all of its
/// predecessors sit in stages `< k`. Within a stage, tasks keep the graph's
/// insertion order (i.e. registration order), which keeps plans stable and
/// deterministic. Fails with [`PipelineError::CycleDetected`] naming the
/// cycle's member tasks when no valid ordering exists.
pub fn resolve(graph: &DagGraph) -> Result<ExecutionPlan> {
    layer(graph, None)
}

/// Layer only the subgraph needed for `target`: the task itself plus the
/// transitive closure of its predecessors.
pub fn resolve_target(graph: &DagGraph, target: &str) -> Result<ExecutionPlan> {
    if !graph.contains(target) {
        return Err(PipelineError::TaskNotFound(target.to_string()));
    }

    let mut closure: HashSet<TaskName> = HashSet::new();
    let mut stack = vec![target.to_string()];
    while let Some(name) = stack.pop() {
        if !closure.insert(name.clone()) {
            continue;
        }
        for dep in graph.dependencies_of(&name) {
            stack.push(dep.clone());
        }
    }

    layer(graph, Some(&closure))
}

fn layer(graph: &DagGraph, restrict: Option<&HashSet<TaskName>>) -> Result<ExecutionPlan> {
    let in_scope = |name: &str| restrict.is_none_or(|set| set.contains(name));
    let total = graph.tasks().filter(|n| in_scope(n)).count();

    let mut placed: HashSet<TaskName> = HashSet::new();
    let mut stages: Vec<Vec<TaskName>> = Vec::new();

    while placed.len() < total {
        let mut stage: Vec<TaskName> = Vec::new();
        for name in graph.tasks() {
            if !in_scope(name) || placed.contains(name) {
                continue;
            }
            let ready = graph
                .dependencies_of(name)
                .iter()
                .filter(|d| in_scope(d))
                .all(|d| placed.contains(d.as_str()));
            if ready {
                stage.push(name.to_string());
            }
        }

        if stage.is_empty() {
            // Nothing eligible but tasks remain: there is a cycle.
            return Err(PipelineError::CycleDetected(cycle_members(
                graph, &placed, restrict,
            )));
        }

        // Insert only after the whole stage is collected, so a task never
        // satisfies a sibling in its own stage.
        for name in &stage {
            placed.insert(name.clone());
        }
        stages.push(stage);
    }

    debug!(stages = stages.len(), tasks = total, "resolved execution plan");
    Ok(ExecutionPlan { stages })
}

/// Name the tasks participating in a cycle among the unplaced remainder,
/// using strongly connected components, in graph insertion order.
fn cycle_members(
    graph: &DagGraph,
    placed: &HashSet<TaskName>,
    restrict: Option<&HashSet<TaskName>>,
) -> Vec<TaskName> {
    let in_scope = |name: &str| restrict.is_none_or(|set| set.contains(name));
    let remaining: Vec<&str> = graph
        .tasks()
        .filter(|n| in_scope(n) && !placed.contains(*n))
        .collect();

    let mut digraph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for name in remaining.iter().copied() {
        digraph.add_node(name);
    }
    for name in remaining.iter().copied() {
        for dep in graph.dependencies_of(name) {
            if remaining.contains(&dep.as_str()) {
                digraph.add_edge(dep.as_str(), name, ());
            }
        }
    }

    let mut members: HashSet<&str> = HashSet::new();
    for scc in tarjan_scc(&digraph) {
        // A lone node only counts when it depends on itself.
        if scc.len() > 1 || digraph.contains_edge(scc[0], scc[0]) {
            members.extend(scc);
        }
    }

    if members.is_empty() {
        // Degenerate fallback; every realistic stall comes from an SCC.
        members.extend(remaining.iter());
    }

    graph
        .tasks()
        .filter(|n| members.contains(n))
        .map(|s| s.to_string())
        .collect()
}
