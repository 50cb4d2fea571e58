// src/incremental.rs

//! Timestamp-based incremental filter for copy-style tasks.
//!
//! Deliberately the same (imprecise) policy as compare-by-newer-timestamp
//! tooling: clock skew and content changes with identical timestamps are not
//! handled. Callers wanting a stronger guarantee need content comparison,
//! which this crate does not do.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::SystemTime;

use crate::errors::{PipelineError, Result};

/// Returns `true` when `dest` needs (re)producing from `src`: either `dest`
/// does not exist, or `src`'s last-modified time is strictly newer.
///
/// Pure check, no side effects; filesystem stat errors surface as
/// [`PipelineError::Io`].
pub fn should_process(src: &Path, dest: &Path) -> Result<bool> {
    let src_modified = modified_time(src)?;

    let dest_meta = match fs::metadata(dest) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(true),
        Err(err) => return Err(PipelineError::io(dest, err)),
    };
    let dest_modified = dest_meta
        .modified()
        .map_err(|err| PipelineError::io(dest, err))?;

    Ok(src_modified > dest_modified)
}

fn modified_time(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|err| PipelineError::io(path, err))
}
