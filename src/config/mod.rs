// src/config/mod.rs

//! Pipeline configuration: TOML model, loading, and validation.
//!
//! The config declares the pipeline's task graph and watch bindings in one
//! place instead of nesting runner combinators in code: every task lists the
//! tasks it runs after, and stage grouping falls out of the resolver.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, CopySpec, PipelineSection, TaskConfig, WatchConfig};
pub use validate::validate_config;
