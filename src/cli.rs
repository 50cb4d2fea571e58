// src/cli.rs

//! CLI argument parsing using `clap` (derive).

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `stagehand`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stagehand",
    version,
    about = "Declarative build-task orchestrator: staged runs, watch mode, incremental copies.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the pipeline config file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Stagehand.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STAGEHAND_LOG` or a default level is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run a task and everything it depends on.
    Run {
        /// Name of the target task.
        task: String,
    },
    /// Resolve and print the staged execution plan without running anything.
    Plan {
        /// Name of the target task; omit to plan the whole pipeline.
        task: Option<String>,
    },
    /// Watch configured patterns and re-run bound tasks on changes.
    Watch {
        /// Restrict watching to bindings for these tasks; omit for all.
        tasks: Vec<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
