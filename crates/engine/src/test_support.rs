// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fakes for engine tests.

use crate::error::RenderError;
use crate::pipeline::{Pipeline, PipelineOutput};
use async_trait::async_trait;
use mg_core::{JobId, JobState, RenderJob, StageError};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

struct FakePipelineState {
    starts: Vec<JobId>,
    running: usize,
    max_running: usize,
    fail_ids: HashSet<JobId>,
    gated: bool,
    emit_dir: Option<PathBuf>,
}

/// Instrumented in-memory pipeline.
///
/// Records start order, tracks the high-water mark of concurrent runs,
/// and can hold every run at a gate until the test releases it.
pub struct FakePipeline {
    state: Mutex<FakePipelineState>,
    gate: Semaphore,
}

/// Cloneable handle; `Pipeline` is implemented for `Arc<FakePipeline>`.
pub fn fake_pipeline() -> Arc<FakePipeline> {
    Arc::new(FakePipeline {
        state: Mutex::new(FakePipelineState {
            starts: Vec::new(),
            running: 0,
            max_running: 0,
            fail_ids: HashSet::new(),
            gated: false,
            emit_dir: None,
        }),
        gate: Semaphore::new(0),
    })
}

impl FakePipeline {
    /// Hold every run at the gate until [`FakePipeline::release`].
    pub fn gate_runs(&self) {
        self.state.lock().gated = true;
    }

    /// Let `n` gated runs proceed.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Emit a real workspace and artifact under `dir` for each run, so
    /// delivery paths can be exercised end to end.
    pub fn emit_into(&self, dir: impl Into<PathBuf>) {
        self.state.lock().emit_dir = Some(dir.into());
    }

    /// Make runs for this job id fail.
    pub fn fail_job(&self, id: impl Into<JobId>) {
        self.state.lock().fail_ids.insert(id.into());
    }

    /// Job ids in the order their runs started.
    pub fn starts(&self) -> Vec<JobId> {
        self.state.lock().starts.clone()
    }

    /// Highest number of runs observed in flight at once.
    pub fn max_running(&self) -> usize {
        self.state.lock().max_running
    }
}

#[async_trait]
impl Pipeline for Arc<FakePipeline> {
    async fn run(&self, job: &mut RenderJob) -> Result<PipelineOutput, RenderError> {
        let gated = {
            let mut state = self.state.lock();
            state.starts.push(job.id.clone());
            state.running += 1;
            state.max_running = state.max_running.max(state.running);
            state.gated
        };
        if gated {
            // Test-controlled; a closed gate would be a test bug.
            let permit = self.gate.acquire().await;
            if let Ok(permit) = permit {
                permit.forget();
            }
        } else {
            tokio::task::yield_now().await;
        }
        let failed = {
            let mut state = self.state.lock();
            state.running -= 1;
            state.fail_ids.contains(&job.id)
        };
        if failed {
            job.fail();
            return Err(RenderError::Stage {
                stage: JobState::Separating,
                source: StageError::ToolMissing { tool: "fake".to_string() },
            });
        }
        job.state = JobState::Mixing;
        let emit_dir = self.state.lock().emit_dir.clone();
        let (workspace, artifact) = match emit_dir {
            Some(dir) => {
                let workspace = dir.join(format!("ws-{}", job.id));
                let artifact = workspace.join(format!("{}_render.mp3", job.id));
                std::fs::create_dir_all(&workspace).expect("fake workspace");
                std::fs::write(&artifact, b"render").expect("fake artifact");
                (workspace, artifact)
            }
            None => (
                PathBuf::from(format!("/fake/ws-{}", job.id)),
                PathBuf::from(format!("/fake/{}.mp3", job.id)),
            ),
        };
        job.workspace_path = Some(workspace.clone());
        Ok(PipelineOutput { artifact, workspace })
    }
}
