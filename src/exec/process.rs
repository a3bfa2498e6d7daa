use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::Command;

use super::{ExecOutcome, ExecOutput};

/// How long `is_installed` waits for a helper's version output.
const VERSION_CHECK_TIMEOUT_SECS: u64 = 5;

/// Spawn `command`, collect its output, and kill it if `timeout` expires.
///
/// A program that cannot be found maps to [`ExecOutcome::Unavailable`].
pub(super) async fn run_with_timeout(
    strategy: &'static str,
    mut command: Command,
    timeout: Duration,
) -> Result<ExecOutcome> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = match command.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("{strategy}: helper not found");
            return Ok(ExecOutcome::Unavailable);
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to start {strategy}")),
    };

    // Dropping the future on timeout drops the child, which kills it.
    let Ok(output) = tokio::time::timeout(timeout, child.wait_with_output()).await else {
        tracing::warn!("{strategy}: timed out after {}s", timeout.as_secs());
        return Ok(ExecOutcome::TimedOut);
    };
    let output = output.with_context(|| format!("Failed to collect {strategy} output"))?;

    Ok(ExecOutcome::Completed(ExecOutput {
        strategy,
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }))
}

/// Check that `program` can be spawned by running it with `version_arg`.
/// The exit status does not matter, only whether the binary exists.
pub(super) async fn is_installed(program: &str, version_arg: &str) -> bool {
    let spawned = Command::new(program)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn();

    match spawned {
        Ok(mut child) => {
            let timeout = Duration::from_secs(VERSION_CHECK_TIMEOUT_SECS);
            // Hanging still proves the binary exists.
            let _ = tokio::time::timeout(timeout, child.wait()).await;
            true
        }
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!("Could not run {program}: {e}");
            }
            false
        }
    }
}
