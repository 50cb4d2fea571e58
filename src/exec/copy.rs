// src/exec/copy.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::config::model::CopySpec;
use crate::errors::PipelineError;
use crate::incremental::should_process;
use crate::registry::TaskBody;

/// Build a task body that copies a directory tree, skipping destination
/// files that are at least as new as their source (timestamp comparison).
///
/// The optional `pattern` glob is compiled up front, so a bad pattern
/// fails registration rather than the first run.
pub fn copy_body(task: &str, spec: &CopySpec) -> crate::errors::Result<TaskBody> {
    let filter = match &spec.pattern {
        Some(pattern) => Some(build_globset(pattern).map_err(|err| {
            PipelineError::Config(format!(
                "task '{task}': invalid copy pattern '{pattern}': {err:#}"
            ))
        })?),
        None => None,
    };

    let src = PathBuf::from(&spec.src);
    let dest = PathBuf::from(&spec.dest);
    Ok(Arc::new(move || {
        let src = src.clone();
        let dest = dest.clone();
        let filter = filter.clone();
        Box::pin(async move { copy_tree(&src, &dest, filter.as_ref()).await })
    }))
}

async fn copy_tree(src_root: &Path, dest_root: &Path, filter: Option<&GlobSet>) -> Result<()> {
    let mut pending = vec![src_root.to_path_buf()];
    let mut copied = 0usize;
    let mut skipped = 0usize;

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .with_context(|| format!("reading directory {dir:?}"))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("reading directory entry in {dir:?}"))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .with_context(|| format!("stat on {path:?}"))?;

            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let rel = path
                .strip_prefix(src_root)
                .with_context(|| format!("relativizing {path:?}"))?;
            if let Some(set) = filter {
                let rel_str = rel.to_string_lossy().replace('\\', "/");
                if !set.is_match(&rel_str) {
                    continue;
                }
            }

            let dest = dest_root.join(rel);
            if !should_process(&path, &dest)? {
                skipped += 1;
                continue;
            }
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating directory {parent:?}"))?;
            }
            tokio::fs::copy(&path, &dest)
                .await
                .with_context(|| format!("copying {path:?} to {dest:?}"))?;
            copied += 1;
        }
    }

    debug!(copied, skipped, "copy task finished");
    Ok(())
}

fn build_globset(pattern: &str) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    builder.add(Glob::new(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?);
    Ok(builder.build()?)
}
