// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mg-core: Domain types for the MinusGolos render service.
//!
//! No I/O lives here: identifiers, the supported-percentage set, the
//! render-job state machine, the filesystem naming convention and the
//! typed stage failure taxonomy.

pub mod macros;

pub mod error;
pub mod id;
pub mod job;
pub mod naming;
pub mod percentage;

pub use error::{StageError, StageResult};
pub use id::{DeliveryRef, JobId, RequesterId};
#[cfg(any(test, feature = "test-support"))]
pub use job::RenderJobBuilder;
pub use job::{JobState, RenderJob};
pub use naming::{CompletionRecord, WorkspaceKey};
pub use percentage::Percentage;
