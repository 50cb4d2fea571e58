// src/watch/debounce.rs

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Sleep};
use tracing::debug;

use crate::registry::TaskName;

/// Operation invoked when a binding fires: run the bound task once.
pub type TaskInvoker =
    Arc<dyn Fn(TaskName) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Lifecycle of a single watch binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// No change seen, nothing running.
    Idle,
    /// A change arrived; waiting out the coalescing window.
    Pending,
    /// The bound task is being invoked.
    Running,
    /// Invocation in flight plus exactly one queued re-run. Further events
    /// are absorbed, never stacked.
    RunningQueued,
}

/// What the driver must do after feeding an input to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    StartTimer,
    StartRun,
}

/// Pure per-binding debounce/coalesce state machine.
///
/// Inputs are filesystem events, the coalescing timer firing, and run
/// completion; the driver supplies the timing and the actual invocation.
#[derive(Debug, Clone)]
pub struct DebounceMachine {
    state: BindingState,
}

impl Default for DebounceMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DebounceMachine {
    pub fn new() -> Self {
        Self {
            state: BindingState::Idle,
        }
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    /// A qualifying filesystem event arrived.
    pub fn on_event(&mut self) -> Action {
        match self.state {
            BindingState::Idle => {
                self.state = BindingState::Pending;
                Action::StartTimer
            }
            // Events inside the window coalesce into the pending run.
            BindingState::Pending => Action::None,
            BindingState::Running => {
                self.state = BindingState::RunningQueued;
                Action::None
            }
            // Already queued; absorb.
            BindingState::RunningQueued => Action::None,
        }
    }

    /// The coalescing window elapsed.
    pub fn on_timer(&mut self) -> Action {
        match self.state {
            BindingState::Pending => {
                self.state = BindingState::Running;
                Action::StartRun
            }
            _ => Action::None,
        }
    }

    /// The invocation reached a terminal state.
    pub fn on_run_complete(&mut self) -> Action {
        match self.state {
            BindingState::Running => {
                self.state = BindingState::Idle;
                Action::None
            }
            BindingState::RunningQueued => {
                self.state = BindingState::Running;
                Action::StartRun
            }
            _ => Action::None,
        }
    }
}

/// Messages into a binding's driver loop.
#[derive(Debug, Clone, Copy)]
pub(crate) enum BindingMsg {
    FsEvent,
    RunDone,
}

/// Async driver around one [`DebounceMachine`].
///
/// Owns the coalescing timer and dispatches the bound task through the
/// supplied invoker. One driver per watch binding.
#[derive(Debug)]
pub struct BindingDriver {
    tx: mpsc::UnboundedSender<BindingMsg>,
    handle: JoinHandle<()>,
}

impl BindingDriver {
    pub fn spawn(task: TaskName, window: Duration, invoker: TaskInvoker) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let loop_tx = tx.clone();
        let handle = tokio::spawn(drive(task, window, rx, loop_tx, invoker));
        Self { tx, handle }
    }

    /// Feed a qualifying filesystem event into the binding.
    pub fn notify_change(&self) {
        let _ = self.tx.send(BindingMsg::FsEvent);
    }

    pub(crate) fn event_sender(&self) -> mpsc::UnboundedSender<BindingMsg> {
        self.tx.clone()
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

enum DriveInput {
    Msg(Option<BindingMsg>),
    TimerFired,
}

async fn drive(
    task: TaskName,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<BindingMsg>,
    tx: mpsc::UnboundedSender<BindingMsg>,
    invoker: TaskInvoker,
) {
    let mut machine = DebounceMachine::new();
    let mut timer: Option<Pin<Box<Sleep>>> = None;

    loop {
        let input = if let Some(active) = timer.as_mut() {
            tokio::select! {
                msg = rx.recv() => DriveInput::Msg(msg),
                _ = active.as_mut() => DriveInput::TimerFired,
            }
        } else {
            DriveInput::Msg(rx.recv().await)
        };

        let action = match input {
            DriveInput::TimerFired => {
                timer = None;
                machine.on_timer()
            }
            DriveInput::Msg(Some(BindingMsg::FsEvent)) => machine.on_event(),
            DriveInput::Msg(Some(BindingMsg::RunDone)) => machine.on_run_complete(),
            DriveInput::Msg(None) => break,
        };

        match action {
            Action::None => {}
            Action::StartTimer => {
                debug!(task = %task, "change seen; debouncing");
                timer = Some(Box::pin(sleep(window)));
            }
            Action::StartRun => {
                debug!(task = %task, "invoking watch-bound task");
                let invoker = Arc::clone(&invoker);
                let tx = tx.clone();
                let task = task.clone();
                tokio::spawn(async move {
                    invoker(task).await;
                    let _ = tx.send(BindingMsg::RunDone);
                });
            }
        }
    }
}
