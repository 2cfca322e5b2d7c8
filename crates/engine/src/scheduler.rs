// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission control: FIFO queue gated by a concurrency permit pool.
//!
//! Jobs start strictly in arrival order; at most `concurrency` pipelines
//! run at once; completion order is whatever it is. One drain task pops
//! the queue head, waits for a permit, then spawns the pipeline run. The
//! drain flag is cleared under the same lock that observes the queue
//! empty, so a submit landing between "queue observed empty" and "drain
//! exits" can never strand a job.

use crate::error::RenderError;
use crate::pipeline::{Pipeline, PipelineOutput};
use mg_core::RenderJob;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// A job that left the pipeline, one way or the other.
#[derive(Debug)]
pub struct Finished {
    pub job: RenderJob,
    pub result: Result<PipelineOutput, RenderError>,
}

struct QueueState {
    queue: VecDeque<RenderJob>,
    draining: bool,
}

struct SchedulerInner<P> {
    pipeline: Arc<P>,
    permits: Arc<Semaphore>,
    state: Mutex<QueueState>,
    finished_tx: mpsc::UnboundedSender<Finished>,
}

/// FIFO scheduler over a [`Pipeline`].
///
/// Cheap to clone; all clones feed the same queue and permit pool.
pub struct Scheduler<P> {
    inner: Arc<SchedulerInner<P>>,
}

impl<P> Clone for Scheduler<P> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<P: Pipeline> Scheduler<P> {
    /// Build a scheduler with a permit pool of `concurrency` (minimum 1).
    /// The receiver yields every finished job exactly once.
    pub fn new(pipeline: P, concurrency: usize) -> (Self, mpsc::UnboundedReceiver<Finished>) {
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        let inner = Arc::new(SchedulerInner {
            pipeline: Arc::new(pipeline),
            permits: Arc::new(Semaphore::new(concurrency.max(1))),
            state: Mutex::new(QueueState { queue: VecDeque::new(), draining: false }),
            finished_tx,
        });
        (Self { inner }, finished_rx)
    }

    /// Enqueue a job. Never blocks and never rejects: the queue is
    /// unbounded, only execution is capped.
    pub fn submit(&self, job: RenderJob) {
        let job_id = job.id.clone();
        let start_drain = {
            let mut state = self.inner.state.lock();
            state.queue.push_back(job);
            if state.draining {
                false
            } else {
                state.draining = true;
                true
            }
        };
        tracing::debug!(job_id = %job_id, start_drain, "job queued");
        if start_drain {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(drain(inner));
        }
    }

    /// Jobs queued but not yet started.
    pub fn queue_len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }
}

async fn drain<P: Pipeline>(inner: Arc<SchedulerInner<P>>) {
    loop {
        let job = {
            let mut state = inner.state.lock();
            match state.queue.pop_front() {
                Some(job) => job,
                None => {
                    // Cleared under the lock: a concurrent submit either
                    // saw draining=true and left the job for us, or sees
                    // draining=false now and starts a fresh drain.
                    state.draining = false;
                    return;
                }
            }
        };

        // Head-of-line wait: the next job does not start (or skip ahead)
        // until a permit frees up.
        let permit = match Arc::clone(&inner.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };

        let pipeline = Arc::clone(&inner.pipeline);
        let finished_tx = inner.finished_tx.clone();
        tokio::spawn(async move {
            let mut job = job;
            let result = pipeline.run(&mut job).await;
            drop(permit);
            // Receiver gone means shutdown; the outcome is already logged.
            let _ = finished_tx.send(Finished { job, result });
        });
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
