// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess supervision with hard deadlines.
//!
//! Every external tool invocation in the pipeline goes through
//! [`run_with_timeout`]: a tool that exceeds its deadline is killed and
//! reported as a timeout for that job only. Waiting on the child is the
//! only suspension point; nothing here blocks the event loop.

use std::process::Output;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Errors from supervised subprocess execution.
#[derive(Debug, Error)]
pub enum SubprocessError {
    /// The binary could not be spawned (missing, not executable).
    #[error("failed to spawn {op}: {source}")]
    Spawn {
        op: String,
        #[source]
        source: std::io::Error,
    },

    /// The process outlived its deadline and was killed.
    #[error("{op} timed out after {timeout:?}")]
    Timeout { op: String, timeout: Duration },

    /// Waiting on the child failed.
    #[error("failed waiting for {op}: {source}")]
    Wait {
        op: String,
        #[source]
        source: std::io::Error,
    },
}

impl SubprocessError {
    /// True when the underlying spawn failure was a missing binary.
    pub fn is_tool_missing(&self) -> bool {
        matches!(
            self,
            SubprocessError::Spawn { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// Run a command to completion with a hard timeout, capturing output.
///
/// On expiry the child is killed (best-effort) before the timeout error
/// is returned, so a wedged tool cannot leak past its job.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    op: &str,
) -> Result<Output, SubprocessError> {
    cmd.stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .map_err(|source| SubprocessError::Spawn { op: op.to_string(), source })?;

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(SubprocessError::Wait { op: op.to_string(), source }),
        Err(_) => {
            // kill_on_drop reaps the child when `child` goes out of scope;
            // log so a stuck tool is visible in the trace.
            tracing::warn!(op, ?timeout, "subprocess deadline expired, killing");
            Err(SubprocessError::Timeout { op: op.to_string(), timeout })
        }
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
