// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delivery handoff: the last hop of a render.
//!
//! Renames the finished artifact to the requester-facing name (the
//! original upload's base and extension, tagged with the percentage),
//! hands it to the messaging transport and records the transport
//! reference so an identical re-request can be forwarded instead of
//! re-rendered. A rejected send leaves the artifact in place.

use crate::error::RenderError;
use crate::workspace::WorkspaceError;
use mg_adapters::{CatalogAdapter, DeliveryAdapter};
use mg_core::naming;
use mg_core::{DeliveryRef, RenderJob, RequesterId};
use std::path::{Path, PathBuf};

/// Hands finished artifacts to the messaging collaborator.
#[derive(Debug, Clone)]
pub struct DeliveryHandoff<C, D> {
    catalog: C,
    delivery: D,
}

impl<C: CatalogAdapter, D: DeliveryAdapter> DeliveryHandoff<C, D> {
    pub fn new(catalog: C, delivery: D) -> Self {
        Self { catalog, delivery }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Deliver a rendered artifact to the job's requester.
    ///
    /// The artifact is renamed in place before the send, so a transport
    /// failure leaves the finished file on disk under its final name and
    /// a retry costs no rendering.
    pub async fn deliver(
        &self,
        job: &RenderJob,
        artifact: &Path,
    ) -> Result<DeliveryRef, RenderError> {
        let original = self.catalog.lookup_original_name(&job.id).await?;
        let final_name = naming::delivered_name(&original, job.percentage);
        let final_path = match artifact.parent() {
            Some(parent) => parent.join(&final_name),
            None => PathBuf::from(&final_name),
        };

        if artifact.exists() {
            tokio::fs::rename(artifact, &final_path).await.map_err(|source| {
                WorkspaceError::Move {
                    from: artifact.to_path_buf(),
                    to: final_path.clone(),
                    source,
                }
            })?;
        } else if !final_path.exists() {
            // Neither the rendered name nor the final name is on disk.
            return Err(WorkspaceError::Move {
                from: artifact.to_path_buf(),
                to: final_path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "artifact missing"),
            }
            .into());
        }

        let delivery_ref = self.delivery.send_audio(&job.requester_id, &final_path).await?;
        self.catalog.record_delivery(&job.id, job.percentage, delivery_ref.clone()).await?;
        tracing::info!(
            job_id = %job.id,
            requester = %job.requester_id,
            delivery_ref = %delivery_ref,
            name = %final_name,
            "artifact delivered"
        );
        Ok(delivery_ref)
    }

    /// Re-render short-circuit: if this (job, percentage) was already
    /// delivered once, forward the prior delivery and skip rendering.
    pub async fn forward_existing(
        &self,
        job: &RenderJob,
    ) -> Result<Option<DeliveryRef>, RenderError> {
        let Some(prior) = self.catalog.existing_delivery(&job.id, job.percentage).await? else {
            return Ok(None);
        };
        self.delivery.forward(&job.requester_id, &prior).await?;
        tracing::info!(
            job_id = %job.id,
            requester = %job.requester_id,
            delivery_ref = %prior,
            "forwarded existing rendition"
        );
        Ok(Some(prior))
    }

    /// Push the short human-readable failure notice. Best-effort: a
    /// transport failure here is logged, not propagated.
    pub async fn notify_failure(&self, requester: &RequesterId, error: &RenderError) {
        let notice = error.user_notice();
        if let Err(e) = self.delivery.notify(requester, &notice).await {
            tracing::warn!(requester = %requester, error = %e, "failure notice could not be sent");
        }
    }
}

#[cfg(test)]
#[path = "deliver_tests.rs"]
mod tests;
