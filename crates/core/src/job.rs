// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Render job and its state machine.

use crate::id::{JobId, RequesterId};
use crate::naming::WorkspaceKey;
use crate::percentage::Percentage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle of a render job.
///
/// Linear: `Queued → Normalizing → Separating → Mixing → Delivered`,
/// with `Failed` reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Normalizing,
    Separating,
    Mixing,
    Delivered,
    Failed,
}

crate::simple_display! {
    JobState {
        Queued => "queued",
        Normalizing => "normalizing",
        Separating => "separating",
        Mixing => "mixing",
        Delivered => "delivered",
        Failed => "failed",
    }
}

impl JobState {
    /// The next state on the success path, if any.
    pub fn next(self) -> Option<JobState> {
        match self {
            JobState::Queued => Some(JobState::Normalizing),
            JobState::Normalizing => Some(JobState::Separating),
            JobState::Separating => Some(JobState::Mixing),
            JobState::Mixing => Some(JobState::Delivered),
            JobState::Delivered | JobState::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Delivered | JobState::Failed)
    }
}

/// The unit of work: one requested rendition of one source artifact.
///
/// The pipeline driver is the only writer of `state` while the job is
/// in flight; the scheduler only ever sees it queued or terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderJob {
    pub id: JobId,
    pub requester_id: RequesterId,
    pub percentage: Percentage,
    /// Location of the original uploaded file before normalization.
    pub source_path: PathBuf,
    pub state: JobState,
    /// The job's private working directory; set at admission, gone at
    /// terminal state (except the deliberate delivery-failure hold).
    pub workspace_path: Option<PathBuf>,
}

impl RenderJob {
    pub fn new(
        id: JobId,
        requester_id: RequesterId,
        percentage: Percentage,
        source_path: PathBuf,
    ) -> Self {
        Self { id, requester_id, percentage, source_path, state: JobState::Queued, workspace_path: None }
    }

    /// The `(percentage, id, requesterId)` triple that names this job's
    /// workspace directories.
    pub fn workspace_key(&self) -> WorkspaceKey {
        WorkspaceKey::new(self.percentage, self.id.clone(), self.requester_id.clone())
    }

    /// Advance along the success path. Returns the new state.
    ///
    /// Walking past a terminal state is a driver bug; the state is left
    /// unchanged rather than invented.
    pub fn advance(&mut self) -> JobState {
        if let Some(next) = self.state.next() {
            self.state = next;
        }
        self.state
    }

    /// Mark the job failed (allowed from any state).
    pub fn fail(&mut self) {
        self.state = JobState::Failed;
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

crate::builder! {
    pub struct RenderJobBuilder => RenderJob {
        into {
            id: JobId = "42",
            requester_id: RequesterId = "7",
            source_path: PathBuf = "/tmp/track.mp3",
        }
        set {
            percentage: Percentage = Percentage::Fifteen,
            state: JobState = JobState::Queued,
        }
        option {
            workspace_path: PathBuf = None,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
