// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod incremental;
pub mod logging;
pub mod registry;
pub mod watch;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::cli::{CliArgs, Command};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::dag::{resolve, resolve_target, DagGraph, ExecutionPlan};
use crate::engine::Executor;
use crate::errors::{PipelineError, Result};
use crate::registry::{TaskName, TaskRegistry};
use crate::watch::{compile_bindings, spawn_watch_session, TaskInvoker, WatchBinding};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - registry / resolver / executor
/// - (for `watch`) the file watcher and debounce drivers
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    match args.command {
        Command::Run { task } => run_pipeline(&cfg, &task).await,
        Command::Plan { task } => print_plan(&cfg, task.as_deref()),
        Command::Watch { tasks } => run_watch(&cfg, &config_path, &tasks).await,
    }
}

/// Build a registry from a validated config, in declaration order.
///
/// Fails fast: a duplicate name or a reference to a not-yet-declared task
/// aborts with no partial registry leaking out.
pub fn build_registry(cfg: &ConfigFile) -> Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();
    for task in &cfg.task {
        let body = match (&task.cmd, &task.copy) {
            (Some(cmd), None) => exec::command_body(&task.name, cmd),
            (None, Some(copy)) => exec::copy_body(&task.name, copy)?,
            (None, None) => TaskRegistry::noop_body(),
            (Some(_), Some(_)) => {
                // validate_config rejects this, but never trust the caller.
                return Err(PipelineError::Config(format!(
                    "task '{}' declares both `cmd` and `copy`; pick one",
                    task.name
                )));
            }
        };
        registry.register(task.name.clone(), task.after.clone(), body)?;
    }
    Ok(registry)
}

/// Watch bindings from config, in declaration order.
pub fn watch_bindings(cfg: &ConfigFile) -> Vec<WatchBinding> {
    cfg.watch
        .iter()
        .map(|w| WatchBinding {
            pattern: w.pattern.clone(),
            task: w.task.clone(),
        })
        .collect()
}

async fn run_pipeline(cfg: &ConfigFile, target: &str) -> Result<()> {
    let registry = Arc::new(build_registry(cfg)?);
    let graph = DagGraph::from_registry(&registry);
    let plan = resolve_target(&graph, target)?;

    let executor = Executor::new(Arc::clone(&registry), cfg.pipeline.max_parallel);

    // Ctrl-C → cooperative cancellation: no new stages, in-flight bodies finish.
    {
        let cancel = executor.cancel_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; cancelling after current stage");
                cancel.cancel();
            }
        });
    }

    info!(target = %target, stages = plan.stages().len(), "pipeline run starting");
    let report = executor.run(&plan).await?;
    report.into_result().map(|_| ())
}

fn print_plan(cfg: &ConfigFile, target: Option<&str>) -> Result<()> {
    let registry = build_registry(cfg)?;
    let graph = DagGraph::from_registry(&registry);
    let plan = match target {
        Some(task) => resolve_target(&graph, task)?,
        None => resolve(&graph)?,
    };
    print_stages(target, &plan);
    Ok(())
}

fn print_stages(target: Option<&str>, plan: &ExecutionPlan) {
    match target {
        Some(task) => println!("stagehand plan for '{task}'"),
        None => println!("stagehand plan"),
    }
    println!(
        "  {} task(s) across {} stage(s):",
        plan.task_count(),
        plan.stages().len()
    );
    for (i, stage) in plan.stages().iter().enumerate() {
        println!("  stage {i}: {}", stage.join(", "));
    }
}

async fn run_watch(cfg: &ConfigFile, config_path: &Path, tasks: &[TaskName]) -> Result<()> {
    let registry = Arc::new(build_registry(cfg)?);

    let mut bindings = watch_bindings(cfg);
    if !tasks.is_empty() {
        for task in tasks {
            registry.lookup(task)?;
        }
        let wanted: HashSet<&str> = tasks.iter().map(|s| s.as_str()).collect();
        bindings.retain(|b| wanted.contains(b.task.as_str()));
    }
    if bindings.is_empty() {
        return Err(PipelineError::Config(
            "no watch bindings match the requested tasks".to_string(),
        ));
    }

    let compiled = compile_bindings(&bindings)?;
    let executor = Arc::new(Executor::new(Arc::clone(&registry), cfg.pipeline.max_parallel));

    // A binding fires → run just the bound task, log the outcome, keep
    // watching. Failures never end the session.
    let invoker: TaskInvoker = {
        let executor = Arc::clone(&executor);
        Arc::new(move |task: TaskName| {
            let executor = Arc::clone(&executor);
            Box::pin(async move {
                if let Err(err) = executor.run_task(&task).await {
                    warn!(task = %task, error = %err, "watch-triggered task failed");
                }
            })
        })
    };

    let root = config_root_dir(config_path);
    let window = Duration::from_millis(cfg.pipeline.debounce_ms);
    let session = spawn_watch_session(root, compiled, invoker, window)?;

    info!(bindings = bindings.len(), "watching; press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .map_err(|err| PipelineError::Other(anyhow::Error::new(err).context("listening for Ctrl-C")))?;
    session.stop();
    Ok(())
}

/// Figure out a sensible project root for watching.
///
/// - If the config path has a non-empty parent (e.g. `site/Stagehand.toml`),
///   use that directory.
/// - If it's a bare filename, fall back to the current working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
