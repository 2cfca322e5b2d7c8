// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the renderer daemon.

use mg_engine::RenderConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Base directory for workspace directories (`MG_BASE_DIR`, default `.`).
pub fn base_dir() -> PathBuf {
    std::env::var("MG_BASE_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
}

/// Concurrency permit pool size (`MG_CONCURRENCY`, default 2).
pub fn concurrency() -> usize {
    std::env::var("MG_CONCURRENCY").ok().and_then(|s| s.parse::<usize>().ok()).unwrap_or(2)
}

/// Intake poll interval (`MG_POLL_INTERVAL_MS`, default 10s).
pub fn poll_interval() -> Duration {
    std::env::var("MG_POLL_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

/// Hard deadline per external tool run (`MG_TOOL_TIMEOUT_MS`, default 600s).
pub fn tool_timeout() -> Duration {
    std::env::var("MG_TOOL_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(600))
}

/// ffmpeg binary override (`MG_FFMPEG_BIN`).
pub fn ffmpeg_bin() -> String {
    std::env::var("MG_FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".to_string())
}

/// Separator binary override (`MG_SEPARATOR_BIN`).
pub fn separator_bin() -> String {
    std::env::var("MG_SEPARATOR_BIN").unwrap_or_else(|_| "spleeter".to_string())
}

/// The full engine configuration from the environment.
pub fn config() -> RenderConfig {
    RenderConfig::default()
        .base_dir(base_dir())
        .concurrency(concurrency())
        .poll_interval(poll_interval())
        .tool_timeout(tool_timeout())
        .ffmpeg_bin(ffmpeg_bin())
        .separator_bin(separator_bin())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
