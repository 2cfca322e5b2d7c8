// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mg-engine: the render job pipeline and scheduler.
//!
//! A submitted job flows: admission (FIFO queue gated by a permit pool)
//! → pipeline driver (normalize → separate → mix, each an external tool)
//! → delivery handoff, with per-job workspaces torn down on every exit
//! path. In the decoupled deployment the renderer process runs the
//! intake scanner and the scheduler, while the messaging process runs
//! the completion watcher over the shared directory namespace.

pub mod config;
pub mod deliver;
pub mod error;
pub mod intake;
pub mod pipeline;
pub mod scheduler;
pub mod service;
pub mod stages;
pub mod watcher;
pub mod workspace;

pub use config::RenderConfig;
pub use deliver::DeliveryHandoff;
pub use error::RenderError;
pub use intake::IntakeScanner;
pub use pipeline::{Pipeline, PipelineDriver, PipelineOutput};
pub use scheduler::{Finished, Scheduler};
pub use service::{RenderService, Submission};
pub use watcher::CompletionWatcher;
pub use workspace::{WorkspaceError, Workspaces};

#[cfg(test)]
mod test_support;
