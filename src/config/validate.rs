// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::ConfigFile;
use crate::errors::{PipelineError, Result};

/// Structural validation of a loaded configuration.
///
/// Checks:
/// - there is at least one task
/// - no task declares both `cmd` and `copy`
/// - every watch binding names a declared task
///
/// Duplicate names and unknown/forward `after` references are rejected by
/// registry construction; cycles cannot be expressed at all under the
/// declare-predecessors-first rule.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_task_actions(cfg)?;
    validate_watch_bindings(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &ConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(PipelineError::Config(
            "config must contain at least one [[task]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_actions(cfg: &ConfigFile) -> Result<()> {
    for task in &cfg.task {
        if task.cmd.is_some() && task.copy.is_some() {
            return Err(PipelineError::Config(format!(
                "task '{}' declares both `cmd` and `copy`; pick one",
                task.name
            )));
        }
    }
    Ok(())
}

fn validate_watch_bindings(cfg: &ConfigFile) -> Result<()> {
    let names: HashSet<&str> = cfg.task.iter().map(|t| t.name.as_str()).collect();
    for binding in &cfg.watch {
        if !names.contains(binding.task.as_str()) {
            return Err(PipelineError::TaskNotFound(binding.task.clone()));
        }
    }
    Ok(())
}
