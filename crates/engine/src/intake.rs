// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Intake scanner: the renderer-process half of the directory protocol.
//!
//! Polls the base directory for `inputSongs…` workspaces dropped off by
//! the front-end, submits each exactly once, and when the pipeline
//! finishes publishes the artifact into the matching `sendSongs…`
//! directory for the completion watcher to pick up. The input workspace
//! is released only after the artifact has been moved out of it.

use crate::config::RenderConfig;
use crate::pipeline::{Pipeline, PipelineOutput};
use crate::scheduler::{Finished, Scheduler};
use crate::workspace::{WorkspaceError, Workspaces};
use mg_core::naming::{self, INPUT_PREFIX, WorkspaceKey};
use mg_core::RenderJob;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Scans for dropped-off input workspaces and feeds the scheduler.
pub struct IntakeScanner<P> {
    workspaces: Workspaces,
    scheduler: Scheduler<P>,
    poll_interval: Duration,
    /// Keys submitted and not yet finished; a directory is never
    /// submitted twice while its job is in flight.
    inflight: Arc<Mutex<HashSet<WorkspaceKey>>>,
}

impl<P: Pipeline> IntakeScanner<P> {
    pub fn new(config: &RenderConfig, scheduler: Scheduler<P>) -> Self {
        Self {
            workspaces: Workspaces::new(config.base_dir.clone()),
            scheduler,
            poll_interval: config.poll_interval,
            inflight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Scan and publish until the task is dropped.
    pub async fn run(self, mut finished_rx: mpsc::UnboundedReceiver<Finished>) {
        loop {
            tokio::select! {
                Some(finished) = finished_rx.recv() => {
                    self.handle_finished(finished).await;
                }
                () = tokio::time::sleep(self.poll_interval) => {
                    self.scan_once().await;
                }
            }
        }
    }

    /// One scan of the base directory. Returns how many jobs were
    /// submitted.
    pub async fn scan_once(&self) -> usize {
        let mut submitted = 0;
        let mut entries = match tokio::fs::read_dir(self.workspaces.base_dir()).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "intake scan: cannot list base dir");
                return 0;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(key) = WorkspaceKey::parse(INPUT_PREFIX, name) else { continue };
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let Some(source) = sole_audio_file(&dir).await else {
                // Empty, still uploading, or ambiguous.
                continue;
            };
            if !self.inflight.lock().insert(key.clone()) {
                continue;
            }
            let job = RenderJob::new(
                key.job_id.clone(),
                key.requester_id.clone(),
                key.percentage,
                source,
            );
            tracing::info!(job_id = %job.id, dir = %dir.display(), "input workspace picked up");
            self.scheduler.submit(job);
            submitted += 1;
        }
        submitted
    }

    /// Completion of a job this scanner submitted.
    pub async fn handle_finished(&self, finished: Finished) {
        let key = finished.job.workspace_key();
        self.inflight.lock().remove(&key);
        match finished.result {
            Ok(output) => {
                if let Err(e) = self.publish(&key, &output).await {
                    tracing::error!(job_id = %finished.job.id, error = %e, "could not publish finished artifact");
                }
            }
            Err(e) => {
                // The pipeline already failed the job and tore down its
                // workspace; the front-end notices via the absent output.
                tracing::warn!(job_id = %finished.job.id, error = %e, "render failed in the background");
            }
        }
    }

    /// Move the finished artifact into the output workspace and release
    /// the input workspace.
    async fn publish(
        &self,
        key: &WorkspaceKey,
        output: &PipelineOutput,
    ) -> Result<(), WorkspaceError> {
        let send_dir = self.workspaces.acquire_send(key).await?;
        let file_name = output
            .artifact
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("artifact.mp3"));
        let target = send_dir.join(file_name);
        tokio::fs::rename(&output.artifact, &target).await.map_err(|source| {
            WorkspaceError::Move { from: output.artifact.clone(), to: target.clone(), source }
        })?;
        self.workspaces.release(&output.workspace).await?;
        tracing::info!(target = %target.display(), "artifact published for delivery");
        Ok(())
    }
}

/// The single recognized audio file directly inside a directory.
///
/// A directory with zero or more than one audio file is not ready: the
/// upload may still be in progress, and an ambiguous drop-off is never
/// guessed at.
async fn sole_audio_file(dir: &std::path::Path) -> Option<PathBuf> {
    let mut entries = tokio::fs::read_dir(dir).await.ok()?;
    let mut found = None;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if naming::is_audio_file(name) && entry.path().is_file() {
            if found.is_some() {
                return None;
            }
            found = Some(entry.path());
        }
    }
    found
}

#[cfg(test)]
#[path = "intake_tests.rs"]
mod tests;
