// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job workspace lifecycle.
//!
//! Directory names are deterministic from the `(percentage, jobId,
//! requesterId)` key, so acquisition is collision-free by construction
//! and orphans are recognizable by name alone after a restart. No other
//! component deletes a workspace directly.

use mg_core::naming::{INPUT_PREFIX, SEND_PREFIX};
use mg_core::WorkspaceKey;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from workspace creation or teardown.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to create workspace dir {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove workspace dir {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move artifact {from} -> {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Allocates and tears down per-job working directories under one base.
#[derive(Debug, Clone)]
pub struct Workspaces {
    base_dir: PathBuf,
}

impl Workspaces {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the input workspace for a key (not created).
    pub fn input_path(&self, key: &WorkspaceKey) -> PathBuf {
        self.base_dir.join(key.input_dir_name())
    }

    /// Path of the output workspace for a key (not created).
    pub fn send_path(&self, key: &WorkspaceKey) -> PathBuf {
        self.base_dir.join(key.send_dir_name())
    }

    /// Create (if absent) and return the input workspace for a key.
    pub async fn acquire(&self, key: &WorkspaceKey) -> Result<PathBuf, WorkspaceError> {
        let path = self.input_path(key);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| WorkspaceError::Create { path: path.clone(), source })?;
        Ok(path)
    }

    /// Create (if absent) and return the output workspace for a key.
    pub async fn acquire_send(&self, key: &WorkspaceKey) -> Result<PathBuf, WorkspaceError> {
        let path = self.send_path(key);
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| WorkspaceError::Create { path: path.clone(), source })?;
        Ok(path)
    }

    /// Recursively remove a workspace directory and all contents.
    ///
    /// Called exactly once per job on every exit path; a directory that
    /// is already gone counts as released.
    pub async fn release(&self, path: &Path) -> Result<(), WorkspaceError> {
        match tokio::fs::remove_dir_all(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(WorkspaceError::Remove { path: path.to_path_buf(), source }),
        }
    }

    /// Startup sweep: remove leftover workspace directories from a
    /// previous process. Best-effort; returns the number removed.
    pub async fn sweep_orphans(&self) -> usize {
        let mut removed = 0;
        let mut entries = match tokio::fs::read_dir(&self.base_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(base = %self.base_dir.display(), error = %e, "orphan sweep: cannot list base dir");
                return 0;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let is_workspace = (name.starts_with(INPUT_PREFIX)
                && WorkspaceKey::parse(INPUT_PREFIX, name).is_some())
                || (name.starts_with(SEND_PREFIX) && WorkspaceKey::parse(SEND_PREFIX, name).is_some());
            if !is_workspace {
                continue;
            }
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            match tokio::fs::remove_dir_all(&path).await {
                Ok(()) => {
                    tracing::info!(path = %path.display(), "removed orphaned workspace");
                    removed += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove orphaned workspace (best-effort)");
                }
            }
        }
        removed
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
