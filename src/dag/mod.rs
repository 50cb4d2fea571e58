// src/dag/mod.rs

//! Dependency graph representation and plan resolution.
//!
//! - [`graph`] holds a directed graph of tasks keyed by name, in insertion
//!   order. It does not validate acyclicity itself.
//! - [`resolver`] layers the graph into an [`resolver::ExecutionPlan`] of
//!   stages, detecting cycles along the way.

pub mod graph;
pub mod resolver;

pub use graph::DagGraph;
pub use resolver::{resolve, resolve_target, ExecutionPlan};
