// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Tunables shared by the pipeline, scheduler, watcher and intake.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Base directory holding all per-job workspace directories.
    pub base_dir: PathBuf,
    /// Size of the concurrency permit pool (canonically 1–2).
    pub concurrency: usize,
    /// Poll interval for the completion watcher and intake scanner.
    pub poll_interval: Duration,
    /// Hard deadline for a single external tool invocation.
    pub tool_timeout: Duration,
    /// ffmpeg binary (normalize and mix stages).
    pub ffmpeg_bin: String,
    /// Two-stem separator binary (separate stage).
    pub separator_bin: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            concurrency: 2,
            poll_interval: Duration::from_secs(10),
            tool_timeout: Duration::from_secs(600),
            ffmpeg_bin: "ffmpeg".to_string(),
            separator_bin: "spleeter".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn base_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.base_dir = v.into();
        self
    }

    pub fn concurrency(mut self, v: usize) -> Self {
        self.concurrency = v;
        self
    }

    pub fn poll_interval(mut self, v: Duration) -> Self {
        self.poll_interval = v;
        self
    }

    pub fn tool_timeout(mut self, v: Duration) -> Self {
        self.tool_timeout = v;
        self
    }

    pub fn ffmpeg_bin(mut self, v: impl Into<String>) -> Self {
        self.ffmpeg_bin = v.into();
        self
    }

    pub fn separator_bin(mut self, v: impl Into<String>) -> Self {
        self.separator_bin = v.into();
        self
    }
}
