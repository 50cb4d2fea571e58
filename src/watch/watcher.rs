// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::watch::debounce::{BindingDriver, BindingMsg, TaskInvoker};
use crate::watch::patterns::CompiledBinding;

/// Handle for a live watch session.
///
/// Keeps the underlying `RecommendedWatcher` alive; stopping (or dropping)
/// the session releases all filesystem observers and the per-binding
/// drivers.
pub struct WatchSession {
    _inner: RecommendedWatcher,
    forward: JoinHandle<()>,
    drivers: Vec<BindingDriver>,
}

impl std::fmt::Debug for WatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSession")
            .field("bindings", &self.drivers.len())
            .finish_non_exhaustive()
    }
}

impl WatchSession {
    /// Stop observing and tear down the binding drivers. In-flight task
    /// invocations are not interrupted.
    pub fn stop(self) {
        self.forward.abort();
        for driver in self.drivers {
            driver.stop();
        }
        info!("watch session stopped");
    }
}

/// Spawn a filesystem watcher over `root` that routes qualifying change
/// events (create/modify/delete) through each matching binding's debounce
/// driver, which in turn invokes the bound task via `invoker`.
pub fn spawn_watch_session(
    root: impl Into<PathBuf>,
    bindings: Vec<CompiledBinding>,
    invoker: TaskInvoker,
    window: Duration,
) -> Result<WatchSession> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or_else(|_| root.clone()); // best-effort

    let mut drivers = Vec::with_capacity(bindings.len());
    let mut routes: Vec<(CompiledBinding, mpsc::UnboundedSender<BindingMsg>)> =
        Vec::with_capacity(bindings.len());
    for binding in bindings {
        let driver = BindingDriver::spawn(
            binding.task().to_string(),
            window,
            TaskInvoker::clone(&invoker),
        );
        routes.push((binding, driver.event_sender()));
        drivers.push(driver);
    }

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // tracing isn't reliable inside notify's thread; stderr it is.
                    eprintln!("stagehand: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("stagehand: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("file watcher started on {:?}", root);

    let forward_root = root.clone();
    let forward = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !qualifying(&event.kind) {
                continue;
            }
            debug!("received notify event: {:?}", event);

            for path in &event.paths {
                let Some(rel) = relative_str(&forward_root, path) else {
                    warn!(
                        "could not relativize path {:?} against root {:?}",
                        path, forward_root
                    );
                    continue;
                };
                for (binding, tx) in &routes {
                    if binding.matches(&rel) {
                        debug!(
                            task = %binding.task(),
                            path = %rel,
                            "watch match"
                        );
                        let _ = tx.send(BindingMsg::FsEvent);
                    }
                }
            }
        }
        debug!("file watcher loop ended");
    });

    Ok(WatchSession {
        _inner: watcher,
        forward,
        drivers,
    })
}

/// Only create/modify/delete count as changes; access notifications do not.
fn qualifying(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// Convert a path into a string relative to `root`, with forward slashes.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}
