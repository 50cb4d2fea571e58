// src/watch/mod.rs

//! File watching and change-triggered re-runs.
//!
//! This module is responsible for:
//! - Compiling `(glob pattern, task)` watch bindings.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Debouncing and coalescing change bursts per binding, with at most one
//!   queued re-run while a previous invocation is still in flight.
//!
//! It does **not** know about the DAG; it only turns filesystem changes into
//! single-task invocations.

pub mod debounce;
pub mod patterns;
pub mod watcher;

pub use debounce::{Action, BindingDriver, BindingState, DebounceMachine, TaskInvoker};
pub use patterns::{compile_bindings, CompiledBinding, WatchBinding};
pub use watcher::{spawn_watch_session, WatchSession};
