// src/watch/patterns.rs

use std::fmt;

use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::Result;
use crate::registry::TaskName;

/// A watch binding as configured: one glob pattern mapped to one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchBinding {
    pub pattern: String,
    pub task: TaskName,
}

/// A binding with its glob compiled for matching.
///
/// Patterns are evaluated against paths relative to the watch root, with
/// forward slashes (e.g. `"src/assets/scss/style.scss"`).
#[derive(Clone)]
pub struct CompiledBinding {
    task: TaskName,
    pattern: String,
    set: GlobSet,
}

impl fmt::Debug for CompiledBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledBinding")
            .field("task", &self.task)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

impl CompiledBinding {
    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Does the given root-relative path fall under this binding?
    pub fn matches(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }
}

/// Compile every binding's pattern. Binding order is preserved.
pub fn compile_bindings(bindings: &[WatchBinding]) -> Result<Vec<CompiledBinding>> {
    let mut compiled = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let glob = Glob::new(&binding.pattern)
            .with_context(|| format!("invalid watch pattern: {}", binding.pattern))?;
        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        let set = builder
            .build()
            .with_context(|| format!("building globset for pattern {}", binding.pattern))?;
        compiled.push(CompiledBinding {
            task: binding.task.clone(),
            pattern: binding.pattern.clone(),
            set,
        });
    }
    Ok(compiled)
}
