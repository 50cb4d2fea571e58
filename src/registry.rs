// src/registry.rs

//! The task registry: named units of work plus their declared predecessors.
//!
//! The registry is an explicit, constructed object scoped to one build
//! invocation. Registration order is significant: it is the tie-break used by
//! the resolver when several tasks become eligible in the same stage, and
//! predecessors must already be registered when a task referencing them is
//! added (build-then-reference).

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::{PipelineError, Result};

/// Public type alias for task names throughout the crate.
pub type TaskName = String;

/// Future returned by a task body.
pub type BodyFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// An opaque task body: a zero-argument operation performing its I/O side
/// effects and completing or failing. The executor never looks inside.
pub type TaskBody = Arc<dyn Fn() -> BodyFuture + Send + Sync>;

/// A named, single-purpose build step with declared predecessors.
pub struct Task {
    name: TaskName,
    after: Vec<TaskName>,
    body: TaskBody,
}

impl Task {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Predecessor task names: all must complete before this task runs.
    pub fn after(&self) -> &[TaskName] {
        &self.after
    }

    /// Cloneable handle to the body, for dispatching onto a spawned task.
    pub fn body(&self) -> TaskBody {
        Arc::clone(&self.body)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("after", &self.after)
            .finish_non_exhaustive()
    }
}

/// Registry of tasks for one build invocation.
///
/// Keeps tasks in registration order (a `Vec`) with a name index on the side,
/// so iteration stays deterministic for plan construction.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
    index: HashMap<TaskName, usize>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task under a unique name with its predecessor set.
    ///
    /// Fails with [`PipelineError::DuplicateTask`] if the name is taken and
    /// [`PipelineError::UnknownDependency`] if any predecessor has not been
    /// registered yet. On error the registry is left unchanged.
    pub fn register<N, I, D>(&mut self, name: N, after: I, body: TaskBody) -> Result<()>
    where
        N: Into<TaskName>,
        I: IntoIterator<Item = D>,
        D: Into<TaskName>,
    {
        let name = name.into();
        let after: Vec<TaskName> = after.into_iter().map(Into::into).collect();

        if self.index.contains_key(&name) {
            return Err(PipelineError::DuplicateTask(name));
        }
        for dep in &after {
            if !self.index.contains_key(dep) {
                return Err(PipelineError::UnknownDependency {
                    task: name,
                    dependency: dep.clone(),
                });
            }
        }

        self.index.insert(name.clone(), self.tasks.len());
        self.tasks.push(Task { name, after, body });
        Ok(())
    }

    /// Look up a task by name.
    pub fn lookup(&self, name: &str) -> Result<&Task> {
        self.index
            .get(name)
            .map(|&i| &self.tasks[i])
            .ok_or_else(|| PipelineError::TaskNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Body that does nothing and succeeds; used for group tasks that exist
    /// only to aggregate predecessors.
    pub fn noop_body() -> TaskBody {
        Arc::new(|| Box::pin(async { Ok(()) }))
    }
}
