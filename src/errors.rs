// src/errors.rs

//! Crate-wide error taxonomy.
//!
//! Registration-time errors (duplicate name, unknown predecessor) and
//! resolution-time errors (cycle) abort before any task body runs. Run-time
//! body failures are collected into [`PipelineError::PipelineFailed`] after
//! the stage they occurred in has drained.

use std::path::PathBuf;

use thiserror::Error;

/// Name and reason of a single failed task, as carried by the aggregate
/// pipeline error and by run reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: String,
    pub reason: String,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("task '{task}' references unknown predecessor '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("cycle detected in task graph involving: {}", .0.join(", "))]
    CycleDetected(Vec<String>),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("task '{task}' failed: {reason}")]
    TaskBody { task: String, reason: String },

    #[error("{} task(s) failed: {}", .0.len(), failed_task_names(.0))]
    PipelineFailed(Vec<TaskFailure>),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

fn failed_task_names(failures: &[TaskFailure]) -> String {
    failures
        .iter()
        .map(|f| f.task.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, PipelineError>;
