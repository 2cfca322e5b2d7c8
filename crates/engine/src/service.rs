// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process render service: scheduler, pipeline and delivery wired
//! together for the single-process deployment.
//!
//! Requests enter through [`RenderService::enqueue`], which validates the
//! percentage at the boundary and short-circuits repeat requests to a
//! forward of the prior delivery. Everything after admission happens in
//! the background: the completion loop delivers each finished render and
//! reports each failure to its requester.

use crate::config::RenderConfig;
use crate::deliver::DeliveryHandoff;
use crate::error::RenderError;
use crate::pipeline::{Pipeline, PipelineDriver};
use crate::scheduler::{Finished, Scheduler};
use crate::workspace::Workspaces;
use mg_adapters::{CatalogAdapter, DeliveryAdapter};
use mg_core::{DeliveryRef, JobId, Percentage, RenderJob, RequesterId};
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Outcome of an admission call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The job entered the FIFO queue.
    Queued,
    /// An identical rendition already existed and was forwarded.
    Forwarded(DeliveryRef),
}

/// The assembled engine for the single-process deployment.
pub struct RenderService<P, C, D> {
    scheduler: Scheduler<P>,
    handoff: DeliveryHandoff<C, D>,
}

impl<C: CatalogAdapter, D: DeliveryAdapter> RenderService<PipelineDriver, C, D> {
    /// Wire the real pipeline to the configured tools and start the
    /// completion loop.
    pub fn start(config: &RenderConfig, catalog: C, delivery: D) -> Self {
        Self::start_with(PipelineDriver::new(config), config, catalog, delivery)
    }
}

impl<P: Pipeline, C: CatalogAdapter, D: DeliveryAdapter> RenderService<P, C, D> {
    pub fn start_with(pipeline: P, config: &RenderConfig, catalog: C, delivery: D) -> Self {
        let (scheduler, finished_rx) = Scheduler::new(pipeline, config.concurrency);
        let handoff = DeliveryHandoff::new(catalog, delivery);
        let workspaces = Workspaces::new(config.base_dir.clone());
        tokio::spawn(completion_loop(finished_rx, handoff.clone(), workspaces));
        Self { scheduler, handoff }
    }

    /// Admit one render request.
    ///
    /// Unsupported percentages are rejected here, before anything is
    /// queued or touched on disk.
    pub async fn enqueue(
        &self,
        job_id: JobId,
        requester_id: RequesterId,
        percent: u8,
        source_path: PathBuf,
    ) -> Result<Submission, RenderError> {
        let percentage = Percentage::parse(percent)?;
        let job = RenderJob::new(job_id, requester_id, percentage, source_path);
        if let Some(prior) = self.handoff.forward_existing(&job).await? {
            return Ok(Submission::Forwarded(prior));
        }
        self.scheduler.submit(job);
        Ok(Submission::Queued)
    }

    /// Jobs admitted but not yet started.
    pub fn queue_depth(&self) -> usize {
        self.scheduler.queue_len()
    }
}

async fn completion_loop<C: CatalogAdapter, D: DeliveryAdapter>(
    mut finished_rx: mpsc::UnboundedReceiver<Finished>,
    handoff: DeliveryHandoff<C, D>,
    workspaces: Workspaces,
) {
    while let Some(mut finished) = finished_rx.recv().await {
        match finished.result {
            Ok(output) => match handoff.deliver(&finished.job, &output.artifact).await {
                Ok(_) => {
                    finished.job.advance();
                    if let Err(e) = workspaces.release(&output.workspace).await {
                        tracing::warn!(job_id = %finished.job.id, error = %e, "workspace release after delivery failed");
                    }
                    tracing::info!(job_id = %finished.job.id, state = %finished.job.state, "job complete");
                }
                Err(e) => {
                    handoff.notify_failure(&finished.job.requester_id, &e).await;
                    if e.keeps_workspace() {
                        tracing::warn!(
                            job_id = %finished.job.id,
                            workspace = %output.workspace.display(),
                            "delivery failed; workspace held so a retry skips rendering"
                        );
                    } else if let Err(release_err) = workspaces.release(&output.workspace).await {
                        tracing::warn!(job_id = %finished.job.id, error = %release_err, "workspace release after failed delivery failed");
                    }
                }
            },
            Err(e) => {
                // The pipeline already failed the job and cleaned up.
                handoff.notify_failure(&finished.job.requester_id, &e).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
