// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline-level error taxonomy.
//!
//! Stage failures are caught by the pipeline driver, converted to a
//! terminal `Failed` state and surfaced to the requester as a short
//! notice naming the failed operation: never a stack trace, and never
//! a crashed scheduler.

use mg_adapters::{CatalogError, DeliveryError};
use mg_core::percentage::UnsupportedPercentage;
use mg_core::{JobState, StageError};
use crate::workspace::WorkspaceError;
use thiserror::Error;

/// Terminal failure of one render job.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No recognized audio file at the expected path or any known
    /// extension of its base name.
    #[error("no audio file found for base name: {base}")]
    InputNotFound { base: String },

    /// A transformation stage failed (tool missing, non-zero exit,
    /// timeout, or a success report with no artifact on disk).
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: JobState,
        #[source]
        source: StageError,
    },

    /// Working-storage creation or teardown failed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// The messaging collaborator rejected the handoff. The workspace is
    /// deliberately kept so a retry does not re-run the separate stage.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// The persistence collaborator failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Percentage outside the supported set, rejected at the boundary.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedPercentage),
}

impl RenderError {
    /// Whether the job's workspace must survive this failure.
    ///
    /// Only a delivery failure holds the workspace: the rendered artifact
    /// is intact and re-running the separate stage to recreate it would
    /// waste the most expensive part of the pipeline.
    pub fn keeps_workspace(&self) -> bool {
        matches!(self, RenderError::Delivery(_))
    }

    /// Human-readable notice for the requester.
    ///
    /// Names the failed operation, never internal detail.
    pub fn user_notice(&self) -> String {
        match self {
            RenderError::InputNotFound { .. } => {
                "Could not find the audio file. Please send it again.".to_string()
            }
            RenderError::Stage { source, .. } if source.is_timeout() => {
                "Processing the file took too long. Please try again later.".to_string()
            }
            RenderError::Stage { stage, .. } => {
                format!("The {stage} step failed. Please try again.")
            }
            RenderError::Workspace(_) => {
                "Could not prepare working storage. Please try again.".to_string()
            }
            RenderError::Delivery(_) => "Please try again.".to_string(),
            RenderError::Catalog(_) => "Please try again later.".to_string(),
            RenderError::Unsupported(_) => {
                "That vocal percentage is not supported.".to_string()
            }
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
