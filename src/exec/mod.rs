// src/exec/mod.rs

//! Task body construction.
//!
//! Bodies are opaque to the executor; this module builds the two concrete
//! kinds the pipeline config can declare:
//!
//! - [`command`] wraps an external transformation tool (style compiler,
//!   templating engine, minifier, deploy client, ...) as a shell command with
//!   stdout/stderr streamed into the log.
//! - [`copy`] is an incremental directory copy that skips destinations that
//!   are already up to date.

pub mod command;
pub mod copy;

pub use command::command_body;
pub use copy::copy_body;
