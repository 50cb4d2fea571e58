// src/engine/executor.rs

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::dag::resolver::ExecutionPlan;
use crate::errors::{PipelineError, Result, TaskFailure};
use crate::registry::{TaskBody, TaskName, TaskRegistry};

/// Terminal state of one task within one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Failed(String),
    Skipped(String),
}

/// Run result for a single task; created when the task is dispatched (or
/// skipped) and finalized when it reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub task: TaskName,
    pub status: RunStatus,
}

/// Complete set of run results for one executor invocation.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    results: Vec<RunResult>,
}

impl RunReport {
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }

    pub fn status_of(&self, task: &str) -> Option<&RunStatus> {
        self.results
            .iter()
            .find(|r| r.task == task)
            .map(|r| &r.status)
    }

    /// Every failed task, in stage order.
    pub fn failures(&self) -> Vec<TaskFailure> {
        self.results
            .iter()
            .filter_map(|r| match &r.status {
                RunStatus::Failed(reason) => Some(TaskFailure {
                    task: r.task.clone(),
                    reason: reason.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.results
            .iter()
            .all(|r| !matches!(r.status, RunStatus::Failed(_)))
    }

    /// Convert into the aggregate outcome: `Ok` with all results when no task
    /// failed, [`PipelineError::PipelineFailed`] enumerating the failures
    /// otherwise.
    pub fn into_result(self) -> Result<Vec<RunResult>> {
        let failures = self.failures();
        if failures.is_empty() {
            Ok(self.results)
        } else {
            Err(PipelineError::PipelineFailed(failures))
        }
    }
}

/// Handle for requesting cooperative whole-run cancellation.
///
/// Cancelling stops the executor from launching further stages; in-flight
/// task bodies are never interrupted.
#[derive(Debug, Clone)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

/// Runs execution plans against a registry.
pub struct Executor {
    registry: Arc<TaskRegistry>,
    /// Worker limit within a stage; 0 means unbounded.
    max_parallel: usize,
    cancel_tx: watch::Sender<bool>,
    cancel_rx: watch::Receiver<bool>,
}

impl Executor {
    pub fn new(registry: Arc<TaskRegistry>, max_parallel: usize) -> Self {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        Self {
            registry,
            max_parallel,
            cancel_tx,
            cancel_rx,
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancel_tx.clone())
    }

    /// Execute the plan's stages strictly in order.
    ///
    /// Within a stage every task is spawned before any is awaited, so a
    /// failing task never prevents its stage siblings from finishing. Later
    /// stages are recorded as skipped after a failure or a cancellation.
    ///
    /// Errors here mean the plan references a task the registry does not
    /// know; body failures are reported through the [`RunReport`].
    pub async fn run(&self, plan: &ExecutionPlan) -> Result<RunReport> {
        let mut results: Vec<RunResult> = Vec::with_capacity(plan.task_count());
        let mut abort_reason: Option<&str> = None;

        for (stage_idx, stage) in plan.stages().iter().enumerate() {
            if *self.cancel_rx.borrow() {
                abort_reason.get_or_insert("run cancelled");
            }
            if let Some(reason) = abort_reason {
                for name in stage {
                    results.push(RunResult {
                        task: name.clone(),
                        status: RunStatus::Skipped(reason.to_string()),
                    });
                }
                continue;
            }

            info!(stage = stage_idx, tasks = stage.len(), "stage started");

            let semaphore = (self.max_parallel > 0)
                .then(|| Arc::new(Semaphore::new(self.max_parallel)));

            let mut handles: Vec<(TaskName, JoinHandle<Result<()>>)> =
                Vec::with_capacity(stage.len());
            for name in stage {
                let task = self.registry.lookup(name)?;
                let body = task.body();
                let name = name.clone();
                let semaphore = semaphore.clone();
                handles.push((
                    name.clone(),
                    tokio::spawn(async move {
                        // The semaphore is never closed, so acquisition only
                        // fails if the run is being torn down; treat that as
                        // running unbounded.
                        let _permit = match semaphore {
                            Some(s) => s.acquire_owned().await.ok(),
                            None => None,
                        };
                        invoke_body(name, body).await
                    }),
                ));
            }

            // Barrier: stage N+1 never starts until every task here is
            // terminal, success or failure.
            let mut stage_failed = false;
            for (name, handle) in handles {
                let status = match handle.await {
                    Ok(Ok(())) => RunStatus::Succeeded,
                    Ok(Err(err)) => {
                        stage_failed = true;
                        RunStatus::Failed(failure_reason(err))
                    }
                    Err(join_err) => {
                        stage_failed = true;
                        RunStatus::Failed(format!("task panicked: {join_err}"))
                    }
                };
                results.push(RunResult { task: name, status });
            }

            if stage_failed {
                abort_reason.get_or_insert("upstream stage failed");
            }
        }

        Ok(RunReport { results })
    }

    /// Run a single task body by name, outside of any plan. Used by the
    /// watch trigger, which re-runs only the bound task.
    pub async fn run_task(&self, name: &str) -> Result<()> {
        let task = self.registry.lookup(name)?;
        invoke_body(task.name().to_string(), task.body()).await
    }
}

/// Invoke one body, logging start and terminal state on its behalf.
async fn invoke_body(name: TaskName, body: TaskBody) -> Result<()> {
    info!(task = %name, "task started");
    let started = Instant::now();
    match body().await {
        Ok(()) => {
            info!(
                task = %name,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "task finished"
            );
            Ok(())
        }
        Err(err) => {
            let reason = format!("{err:#}");
            warn!(task = %name, reason = %reason, "task failed");
            Err(PipelineError::TaskBody { task: name, reason })
        }
    }
}

fn failure_reason(err: PipelineError) -> String {
    match err {
        PipelineError::TaskBody { reason, .. } => reason,
        other => other.to_string(),
    }
}
