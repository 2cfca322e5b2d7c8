// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed stage failures.
//!
//! A stage executor either produces an artifact path or fails with one of
//! these. External tools are never trusted on exit code alone: a zero exit
//! with no artifact on disk is its own failure kind.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single transformation stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// The external tool binary could not be spawned at all.
    #[error("tool not found: {tool}")]
    ToolMissing { tool: String },

    /// The tool ran and exited non-zero.
    #[error("{tool} exited with code {code}: {stderr}")]
    ToolNonZeroExit { tool: String, code: i32, stderr: String },

    /// The tool reported success but the expected output is not on disk.
    #[error("expected artifact not produced: {path}")]
    ArtifactNotProduced { path: PathBuf },

    /// The tool exceeded its hard deadline and was killed.
    #[error("{tool} timed out after {timeout:?}")]
    Timeout { tool: String, timeout: Duration },

    /// Supervising the tool process failed in the runtime itself.
    #[error("failed running {tool}: {message}")]
    Supervise { tool: String, message: String },
}

impl StageError {
    /// True when the failure was a deadline expiry (drives the
    /// "took too long, try again" requester notice).
    pub fn is_timeout(&self) -> bool {
        matches!(self, StageError::Timeout { .. })
    }
}

/// Result of one stage executor invocation.
pub type StageResult = Result<PathBuf, StageError>;
