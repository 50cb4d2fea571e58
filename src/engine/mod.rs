// src/engine/mod.rs

//! Execution engine.
//!
//! The executor walks an execution plan stage by stage:
//! - tasks within a stage run concurrently (optionally bounded),
//! - a stage is complete only when every task in it is terminal,
//! - a failure lets stage siblings finish but prevents later stages,
//! - a cancellation signal stops launching new stages, nothing is interrupted
//!   mid-flight.
//!
//! Task start/finish logging lives here, not inside task bodies.

pub mod executor;

pub use executor::{CancelHandle, Executor, RunReport, RunResult, RunStatus};
