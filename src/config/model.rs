// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [pipeline]
/// max_parallel = 4
/// debounce_ms = 200
///
/// [[task]]
/// name = "clean"
/// cmd = "rm -rf dist"
///
/// [[task]]
/// name = "fonts"
/// copy = { src = "src/assets/fonts", dest = "dist/assets/fonts" }
/// after = ["clean"]
///
/// [[watch]]
/// pattern = "src/assets/scss/**/*.scss"
/// task = "styles"
/// ```
///
/// Tasks are an ordered list; declaration order is registration order, so a
/// task may only name previously declared tasks in `after`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Global behaviour from `[pipeline]`.
    #[serde(default)]
    pub pipeline: PipelineSection,

    /// All tasks from `[[task]]`, in declaration order.
    #[serde(default)]
    pub task: Vec<TaskConfig>,

    /// Watch bindings from `[[watch]]`, in declaration order.
    #[serde(default)]
    pub watch: Vec<WatchConfig>,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    /// Worker limit within a stage; 0 means unbounded (the default).
    #[serde(default)]
    pub max_parallel: usize,

    /// Coalescing window for watch triggers, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    200
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            max_parallel: 0,
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// One `[[task]]` entry.
///
/// A task carries at most one action:
/// - `cmd`: a shell command wrapping an external transformation tool,
/// - `copy`: an incremental directory copy,
/// - neither: a group task aggregating its predecessors.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    pub name: String,

    /// Predecessors: this task waits for every task listed here.
    #[serde(default)]
    pub after: Vec<String>,

    #[serde(default)]
    pub cmd: Option<String>,

    #[serde(default)]
    pub copy: Option<CopySpec>,
}

/// Incremental copy action: `src` directory into `dest` directory, optionally
/// restricted to files matching `pattern` (a glob relative to `src`).
#[derive(Debug, Clone, Deserialize)]
pub struct CopySpec {
    pub src: String,
    pub dest: String,
    #[serde(default)]
    pub pattern: Option<String>,
}

/// One `[[watch]]` entry: a glob pattern bound to a task.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub pattern: String,
    pub task: String,
}
