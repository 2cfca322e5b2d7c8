// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pipeline driver: normalize → separate → mix for one job.
//!
//! The driver owns the job's state transitions and its workspace: on any
//! stage failure the job goes `Failed` and the workspace is torn down
//! before the error is returned, so no caller ever sees a half-rendered
//! directory. On success the workspace is handed to the caller alive,
//! since the artifact inside it still has to be delivered.

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::stages::StageRunner;
use crate::workspace::Workspaces;
use async_trait::async_trait;
use mg_core::naming;
use mg_core::{JobState, RenderJob};
use std::path::{Path, PathBuf};

/// What a successful pipeline run leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    /// The finished delivery artifact, inside the workspace.
    pub artifact: PathBuf,
    /// The workspace holding it; released by the caller after delivery.
    pub workspace: PathBuf,
}

/// Seam between admission and rendering.
///
/// The scheduler and intake are written against this trait so their
/// ordering and concurrency behavior is testable without external tools.
#[async_trait]
pub trait Pipeline: Send + Sync + 'static {
    async fn run(&self, job: &mut RenderJob) -> Result<PipelineOutput, RenderError>;
}

/// The real pipeline: external tools in a per-job workspace.
#[derive(Debug, Clone)]
pub struct PipelineDriver {
    workspaces: Workspaces,
    stages: StageRunner,
}

impl PipelineDriver {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            workspaces: Workspaces::new(config.base_dir.clone()),
            stages: StageRunner::new(config),
        }
    }

    async fn render(&self, job: &mut RenderJob) -> Result<PipelineOutput, RenderError> {
        let key = job.workspace_key();
        let work = self.workspaces.acquire(&key).await?;
        job.workspace_path = Some(work.clone());

        let source = resolve_input(&work, &job.source_path)?;
        let base = naming::file_stem(
            source.file_name().and_then(|n| n.to_str()).unwrap_or_default(),
        )
        .to_string();

        job.advance();
        tracing::info!(job_id = %job.id, state = %job.state, source = %source.display(), "normalizing");
        let wav = self
            .stages
            .normalize(&work, &source, &base)
            .await
            .map_err(|source| RenderError::Stage { stage: JobState::Normalizing, source })?;

        job.advance();
        tracing::info!(job_id = %job.id, state = %job.state, "separating stems");
        self.stages
            .separate(&work, &wav, &base)
            .await
            .map_err(|source| RenderError::Stage { stage: JobState::Separating, source })?;

        job.advance();
        tracing::info!(job_id = %job.id, state = %job.state, percentage = %job.percentage, "mixing");
        let artifact = self
            .stages
            .mix(&work, &base, job.percentage)
            .await
            .map_err(|source| RenderError::Stage { stage: JobState::Mixing, source })?;

        // Stems and the normalized wav can dwarf the artifact; drop them
        // now so only the deliverable leaves the workspace.
        remove_intermediates(&work, &base, &wav, wav != source).await;

        tracing::info!(job_id = %job.id, artifact = %artifact.display(), "render finished");
        Ok(PipelineOutput { artifact, workspace: work })
    }
}

#[async_trait]
impl Pipeline for PipelineDriver {
    async fn run(&self, job: &mut RenderJob) -> Result<PipelineOutput, RenderError> {
        match self.render(job).await {
            Ok(output) => Ok(output),
            Err(e) => {
                job.fail();
                tracing::warn!(job_id = %job.id, error = %e, "render failed");
                if !e.keeps_workspace() {
                    if let Some(work) = job.workspace_path.take() {
                        if let Err(remove_err) = self.workspaces.release(&work).await {
                            tracing::warn!(
                                job_id = %job.id,
                                error = %remove_err,
                                "workspace teardown after failure failed"
                            );
                        }
                    }
                }
                Err(e)
            }
        }
    }
}

/// Best-effort removal of the stems directory and, when normalization
/// produced it, the intermediate wav.
async fn remove_intermediates(work: &Path, base: &str, wav: &Path, wav_was_produced: bool) {
    let stems_dir = work.join(base);
    if let Err(e) = tokio::fs::remove_dir_all(&stems_dir).await {
        tracing::debug!(path = %stems_dir.display(), error = %e, "stem cleanup skipped");
    }
    if wav_was_produced {
        if let Err(e) = tokio::fs::remove_file(wav).await {
            tracing::debug!(path = %wav.display(), error = %e, "wav cleanup skipped");
        }
    }
}

/// The uploaded file as the renderer finds it: the recorded path if it
/// still exists, otherwise a probe over known audio extensions inside
/// the workspace.
fn resolve_input(work: &Path, source: &Path) -> Result<PathBuf, RenderError> {
    if source.is_file() {
        return Ok(source.to_path_buf());
    }
    let base = naming::file_stem(
        source.file_name().and_then(|n| n.to_str()).unwrap_or_default(),
    )
    .to_string();
    for ext in naming::AUDIO_EXTENSIONS {
        let candidate = work.join(format!("{base}.{ext}"));
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(RenderError::InputNotFound { base })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
