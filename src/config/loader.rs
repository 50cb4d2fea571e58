// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::ConfigFile;
use crate::config::validate::validate_config;
use crate::errors::{PipelineError, Result};

/// Load a configuration file from a path, TOML deserialization only.
///
/// Semantic validation (action exclusivity, watch binding targets) lives in
/// [`load_and_validate`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|err| PipelineError::io(path, err))?;
    let config: ConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file and run validation; the recommended entry point.
///
/// Registration-level errors (duplicate names, forward or unknown `after`
/// references) surface later when the registry is built from the config, but
/// still before anything executes.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Default config path: `Stagehand.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Stagehand.toml")
}
