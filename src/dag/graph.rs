// src/dag/graph.rs

use std::collections::HashMap;

use crate::registry::{TaskName, TaskRegistry};

/// In-memory task graph keyed by name, preserving insertion order.
///
/// Each node stores its direct dependencies (the tasks that must complete
/// before it runs). Insertion order matters: the resolver iterates tasks in
/// this order, which is what makes stage membership deterministic
/// (registration-order tie-break). The graph accepts arbitrary edges,
/// including cycles; the resolver is where cycles are rejected.
#[derive(Debug, Clone, Default)]
pub struct DagGraph {
    order: Vec<TaskName>,
    deps: HashMap<TaskName, Vec<TaskName>>,
}

impl DagGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a registry, in registration order.
    pub fn from_registry(registry: &TaskRegistry) -> Self {
        Self::from_nodes(
            registry
                .iter()
                .map(|t| (t.name().to_string(), t.after().to_vec())),
        )
    }

    /// Build a graph from `(name, deps)` pairs. Later duplicates of a name
    /// are ignored.
    pub fn from_nodes<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (TaskName, Vec<TaskName>)>,
    {
        let mut graph = Self::new();
        for (name, deps) in nodes {
            graph.add_node(name, deps);
        }
        graph
    }

    /// Insert a node with its dependency list.
    pub fn add_node(&mut self, name: TaskName, deps: Vec<TaskName>) {
        if self.deps.contains_key(&name) {
            return;
        }
        self.order.push(name.clone());
        self.deps.insert(name, deps);
    }

    /// All task names, in insertion order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.deps.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Immediate dependencies of a task (its declared predecessors).
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.deps.get(name).map(|d| d.as_slice()).unwrap_or(&[])
    }
}
