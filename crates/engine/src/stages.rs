// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage executors: normalize, separate, mix.
//!
//! Each stage wraps one external tool invocation behind
//! [`run_with_timeout`] and verifies the promised artifact actually
//! landed on disk before reporting success. Argument construction is
//! split into pure functions so the exact tool invocations stay
//! unit-testable without spawning anything.

use crate::config::RenderConfig;
use mg_adapters::{run_with_timeout, SubprocessError};
use mg_core::naming;
use mg_core::{Percentage, StageError, StageResult};
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// `ffmpeg -y -i <source> <out.wav>`: decode any supported upload into
/// the canonical PCM intermediate.
pub fn normalize_args(source: &Path, out: &Path) -> Vec<OsString> {
    vec!["-y".into(), "-i".into(), source.into(), out.into()]
}

/// `<separator> separate -p spleeter:2stems -o <work> <wav>`: split the
/// normalized track into accompaniment and vocals.
pub fn separate_args(work_dir: &Path, wav: &Path) -> Vec<OsString> {
    vec![
        "separate".into(),
        "-p".into(),
        "spleeter:2stems".into(),
        "-o".into(),
        work_dir.into(),
        wav.into(),
    ]
}

/// `ffmpeg -y -i <accompaniment> -c:a libmp3lame -b:a 320k <out>`: the
/// instrumental-only encode (no vocal stem in the mix at all).
pub fn encode_args(accompaniment: &Path, out: &Path) -> Vec<OsString> {
    vec![
        "-y".into(),
        "-i".into(),
        accompaniment.into(),
        "-c:a".into(),
        "libmp3lame".into(),
        "-b:a".into(),
        "320k".into(),
        out.into(),
    ]
}

/// Two-input amix with the vocal stem attenuated to `gain` (linear,
/// percentage / 100). The accompaniment passes through at unity.
pub fn mix_args(accompaniment: &Path, vocals: &Path, gain: f32, out: &Path) -> Vec<OsString> {
    let filter =
        format!("[0:a]volume=1[a];[1:a]volume={gain}[v];[a][v]amix=inputs=2:duration=longest");
    vec![
        "-y".into(),
        "-i".into(),
        accompaniment.into(),
        "-i".into(),
        vocals.into(),
        "-filter_complex".into(),
        filter.into(),
        "-c:a".into(),
        "libmp3lame".into(),
        "-q:a".into(),
        "0".into(),
        out.into(),
    ]
}

/// Runs the three transformation stages against configured tool binaries.
#[derive(Debug, Clone)]
pub struct StageRunner {
    ffmpeg_bin: String,
    separator_bin: String,
    timeout: Duration,
}

impl StageRunner {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            ffmpeg_bin: config.ffmpeg_bin.clone(),
            separator_bin: config.separator_bin.clone(),
            timeout: config.tool_timeout,
        }
    }

    /// Normalize the upload into `<base>.wav` inside the workspace.
    ///
    /// An upload that is already PCM wav passes through untouched.
    pub async fn normalize(&self, work_dir: &Path, source: &Path, base: &str) -> StageResult {
        let already_wav = source
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if already_wav {
            return Ok(source.to_path_buf());
        }
        let out = work_dir.join(naming::normalized_name(base));
        self.run_tool(&self.ffmpeg_bin, normalize_args(source, &out), &out).await
    }

    /// Split the normalized track into stems; returns the accompaniment
    /// stem path.
    pub async fn separate(&self, work_dir: &Path, wav: &Path, base: &str) -> StageResult {
        let (accompaniment, _vocals) = naming::stem_paths(work_dir, base);
        self.run_tool(&self.separator_bin, separate_args(work_dir, wav), &accompaniment).await
    }

    /// Produce the delivery artifact from the stems: an instrumental-only
    /// encode at zero percent, a two-input remix otherwise.
    pub async fn mix(
        &self,
        work_dir: &Path,
        base: &str,
        percentage: Percentage,
    ) -> StageResult {
        let (accompaniment, vocals) = naming::stem_paths(work_dir, base);
        if percentage.is_instrumental_only() {
            let out = work_dir.join(naming::minus_name(base));
            self.run_tool(&self.ffmpeg_bin, encode_args(&accompaniment, &out), &out).await
        } else {
            if !vocals.exists() {
                return Err(StageError::ArtifactNotProduced { path: vocals });
            }
            let out = work_dir.join(naming::remix_name(base, percentage));
            self.run_tool(
                &self.ffmpeg_bin,
                mix_args(&accompaniment, &vocals, percentage.gain(), &out),
                &out,
            )
            .await
        }
    }

    async fn run_tool(&self, bin: &str, args: Vec<OsString>, artifact: &Path) -> StageResult {
        let mut cmd = Command::new(bin);
        cmd.args(&args);
        tracing::debug!(tool = bin, artifact = %artifact.display(), "running stage tool");

        let output = run_with_timeout(cmd, self.timeout, bin).await.map_err(|e| match e {
            SubprocessError::Spawn { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                StageError::ToolMissing { tool: bin.to_string() }
            }
            SubprocessError::Timeout { timeout, .. } => {
                StageError::Timeout { tool: bin.to_string(), timeout }
            }
            other => StageError::Supervise { tool: bin.to_string(), message: other.to_string() },
        })?;

        if !output.status.success() {
            return Err(StageError::ToolNonZeroExit {
                tool: bin.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // A zero exit is not proof of output; the artifact must exist.
        if !artifact.exists() {
            return Err(StageError::ArtifactNotProduced { path: artifact.to_path_buf() });
        }
        Ok(artifact.to_path_buf())
    }
}

#[cfg(test)]
#[path = "stages_tests.rs"]
mod tests;
