// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The filesystem naming convention.
//!
//! Directory and artifact names are the wire format of this system: in the
//! decoupled deployment they are the *only* signal between the scheduler
//! process and the renderer process, and after a restart they are how
//! orphaned work is recognized. Every name here is bit-exact and must not
//! drift.
//!
//! - input workspace:  `inputSongs<percentage>:<jobId>:<requesterId>/`
//! - output workspace: `sendSongs<percentage>:<jobId>:<requesterId>/`
//! - instrumental-only artifact: `<base>_minus_320k.mp3`
//! - remixed artifact: `<base>_accompaniment_<percentage>percent_320k.mp3`
//! - delivered name: `<origBase>_<percentage>percent_byMinusGolos.<ext>`

use crate::id::{JobId, RequesterId};
use crate::percentage::Percentage;
use std::path::{Path, PathBuf};

/// Directory-name prefix for input workspaces (renderer consumes these).
pub const INPUT_PREFIX: &str = "inputSongs";

/// Directory-name prefix for output workspaces (watcher consumes these).
pub const SEND_PREFIX: &str = "sendSongs";

/// Audio file extensions the intake recognizes, in probe order.
pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "wav", "flac", "aac", "m4a"];

/// The `(percentage, jobId, requesterId)` triple a workspace directory
/// name encodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceKey {
    pub percentage: Percentage,
    pub job_id: JobId,
    pub requester_id: RequesterId,
}

impl WorkspaceKey {
    pub fn new(percentage: Percentage, job_id: JobId, requester_id: RequesterId) -> Self {
        Self { percentage, job_id, requester_id }
    }

    /// `inputSongs<p>:<job>:<req>`
    pub fn input_dir_name(&self) -> String {
        format!("{}{}:{}:{}", INPUT_PREFIX, self.percentage, self.job_id, self.requester_id)
    }

    /// `sendSongs<p>:<job>:<req>`
    pub fn send_dir_name(&self) -> String {
        format!("{}{}:{}:{}", SEND_PREFIX, self.percentage, self.job_id, self.requester_id)
    }

    /// Parse a directory name with the given prefix back into its key.
    ///
    /// Returns `None` for names that don't match the convention, including
    /// unsupported percentages (which must never have produced a directory
    /// in the first place).
    pub fn parse(prefix: &str, dir_name: &str) -> Option<Self> {
        let rest = dir_name.strip_prefix(prefix)?;
        let mut parts = rest.splitn(3, ':');
        let percentage = Percentage::parse_str(parts.next()?).ok()?;
        let job = parts.next()?;
        let requester = parts.next()?;
        if job.is_empty() || requester.is_empty() {
            return None;
        }
        Some(Self::new(percentage, JobId::new(job), RequesterId::new(requester)))
    }
}

/// `<base>_minus_320k.mp3`: the instrumental-only delivery codec name.
pub fn minus_name(base: &str) -> String {
    format!("{base}_minus_320k.mp3")
}

/// `<base>_accompaniment_<p>percent_320k.mp3`: the remixed artifact name.
pub fn remix_name(base: &str, percentage: Percentage) -> String {
    format!("{base}_accompaniment_{percentage}percent_320k.mp3")
}

/// The artifact name a finished render is expected to have produced.
pub fn expected_artifact_name(source_name: &str, percentage: Percentage) -> String {
    let base = file_stem(source_name);
    if percentage.is_instrumental_only() {
        minus_name(base)
    } else {
        remix_name(base, percentage)
    }
}

/// `<origBase>_<p>percent_byMinusGolos.<ext>`: the name the requester sees.
///
/// Keeps the original upload's extension so the receiving client treats
/// the rendition like the file it came from.
pub fn delivered_name(original_name: &str, percentage: Percentage) -> String {
    let base = file_stem(original_name);
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    format!("{base}_{percentage}percent_byMinusGolos{ext}")
}

/// True if the name carries the requester-facing delivery tag. A file
/// under this name is a finished rendition whose first send was cut
/// short; it can be sent again as-is.
pub fn is_delivered_name(name: &str) -> bool {
    file_stem(name).ends_with("_byMinusGolos") || name.contains("percent_byMinusGolos")
}

/// `<base>.wav`: the canonical intermediate produced by normalization.
pub fn normalized_name(base: &str) -> String {
    format!("{base}.wav")
}

/// Stem paths the separator writes under the workspace: `<base>/accompaniment.wav`
/// and `<base>/vocals.wav`.
pub fn stem_paths(work_dir: &Path, base: &str) -> (PathBuf, PathBuf) {
    let stems = work_dir.join(base);
    (stems.join("accompaniment.wav"), stems.join("vocals.wav"))
}

/// File name without its final extension.
pub fn file_stem(name: &str) -> &str {
    Path::new(name).file_stem().and_then(|s| s.to_str()).unwrap_or(name)
}

/// True if the file name carries a recognized audio extension.
pub fn is_audio_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.iter().any(|known| e.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// A finished render inferred from the filesystem by the completion
/// watcher: the expected, conventionally-named artifact was the sole file
/// in a matched output directory.
///
/// Created by polling, consumed exactly once by a send-and-delete action,
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub key: WorkspaceKey,
    /// Full path of the artifact to deliver.
    pub artifact_path: PathBuf,
    /// The matched directory, removed after delivery.
    pub dir_path: PathBuf,
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
