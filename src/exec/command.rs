// src/exec/command.rs

use std::process::Stdio;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::TaskBody;

/// Build a task body that runs a shell command to completion.
///
/// The command is executed through the platform shell (`sh -c` / `cmd /C`),
/// matching how build steps are written in pipeline configs. A non-zero exit
/// status fails the body.
pub fn command_body(task: &str, cmd: &str) -> TaskBody {
    let task = task.to_string();
    let cmd = cmd.to_string();
    Arc::new(move || {
        let task = task.clone();
        let cmd = cmd.clone();
        Box::pin(async move { run_command(&task, &cmd).await })
    })
}

async fn run_command(task: &str, cmd: &str) -> Result<()> {
    debug!(task = %task, cmd = %cmd, "spawning task process");

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for task '{task}'"))?;

    // Stream both pipes so the child never blocks on a full buffer.
    let stdout_task = child
        .stdout
        .take()
        .map(|out| stream_lines(task.to_string(), "stdout", out));
    let stderr_task = child
        .stderr
        .take()
        .map(|err| stream_lines(task.to_string(), "stderr", err));

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting on process for task '{task}'"))?;

    // Drain the readers before reporting, so the log is complete.
    if let Some(handle) = stdout_task {
        let _ = handle.await;
    }
    if let Some(handle) = stderr_task {
        let _ = handle.await;
    }

    if !status.success() {
        match status.code() {
            Some(code) => bail!("command exited with status {code}"),
            None => bail!("command terminated by signal"),
        }
    }
    Ok(())
}

fn stream_lines<R>(task: String, pipe: &'static str, reader: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if pipe == "stdout" {
                info!(task = %task, "{line}");
            } else {
                debug!(task = %task, "stderr: {line}");
            }
        }
    })
}
