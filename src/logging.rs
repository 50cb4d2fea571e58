// src/logging.rs

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `STAGEHAND_LOG` environment variable (full env-filter syntax)
//! 3. default to `info`

use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;
use crate::errors::Result;

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_env("STAGEHAND_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info")),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}
