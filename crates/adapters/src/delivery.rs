// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messaging collaborator seam.
//!
//! The conversational front-end owns the transport; the pipeline only
//! needs three verbs: send a finished artifact, forward a previously
//! delivered one, and push a short human-readable notice. A rejected
//! send must not destroy the artifact; the caller decides whether to
//! retry or report.

use async_trait::async_trait;
use mg_core::{DeliveryRef, RequesterId};
use std::path::Path;
use thiserror::Error;

/// Errors from delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The transport rejected the payload (bad request, too large, ...).
    #[error("transport rejected delivery: {0}")]
    Rejected(String),

    /// The transport itself failed (network, backend down).
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Adapter for handing finished artifacts to the messaging collaborator.
#[async_trait]
pub trait DeliveryAdapter: Clone + Send + Sync + 'static {
    /// Send an audio artifact to a requester. Returns the transport's
    /// opaque reference for the delivered message.
    async fn send_audio(
        &self,
        requester: &RequesterId,
        artifact: &Path,
    ) -> Result<DeliveryRef, DeliveryError>;

    /// Forward an already-delivered artifact to a requester (re-render
    /// short-circuit; no rendering, no file I/O).
    async fn forward(
        &self,
        requester: &RequesterId,
        prior: &DeliveryRef,
    ) -> Result<(), DeliveryError>;

    /// Send a short plain-text notice (failure reports).
    async fn notify(&self, requester: &RequesterId, text: &str) -> Result<(), DeliveryError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{DeliveryAdapter, DeliveryError};
    use async_trait::async_trait;
    use mg_core::{DeliveryRef, RequesterId};
    use parking_lot::Mutex;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// Recorded delivery operation.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum DeliveryCall {
        SendAudio { requester: RequesterId, artifact: PathBuf },
        Forward { requester: RequesterId, prior: DeliveryRef },
        Notify { requester: RequesterId, text: String },
    }

    struct FakeDeliveryState {
        calls: Vec<DeliveryCall>,
        fail_sends: bool,
        next_ref: u64,
    }

    /// Fake delivery adapter for testing.
    ///
    /// Records every call; `send_audio` mints sequential references
    /// (`sent-1`, `sent-2`, ...) unless failure injection is armed.
    #[derive(Clone)]
    pub struct FakeDeliveryAdapter {
        inner: Arc<Mutex<FakeDeliveryState>>,
    }

    impl Default for FakeDeliveryAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeDeliveryState {
                    calls: Vec::new(),
                    fail_sends: false,
                    next_ref: 0,
                })),
            }
        }
    }

    impl FakeDeliveryAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make subsequent `send_audio` calls fail with `Rejected`.
        pub fn fail_sends(&self) {
            self.inner.lock().fail_sends = true;
        }

        /// Get all recorded calls.
        pub fn calls(&self) -> Vec<DeliveryCall> {
            self.inner.lock().calls.clone()
        }

        /// Artifacts successfully sent, in order.
        pub fn sent_artifacts(&self) -> Vec<PathBuf> {
            self.inner
                .lock()
                .calls
                .iter()
                .filter_map(|c| match c {
                    DeliveryCall::SendAudio { artifact, .. } => Some(artifact.clone()),
                    _ => None,
                })
                .collect()
        }

        /// Notices sent, in order.
        pub fn notices(&self) -> Vec<String> {
            self.inner
                .lock()
                .calls
                .iter()
                .filter_map(|c| match c {
                    DeliveryCall::Notify { text, .. } => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl DeliveryAdapter for FakeDeliveryAdapter {
        async fn send_audio(
            &self,
            requester: &RequesterId,
            artifact: &Path,
        ) -> Result<DeliveryRef, DeliveryError> {
            let mut inner = self.inner.lock();
            if inner.fail_sends {
                return Err(DeliveryError::Rejected("injected failure".to_string()));
            }
            inner.calls.push(DeliveryCall::SendAudio {
                requester: requester.clone(),
                artifact: artifact.to_path_buf(),
            });
            inner.next_ref += 1;
            Ok(DeliveryRef::new(format!("sent-{}", inner.next_ref)))
        }

        async fn forward(
            &self,
            requester: &RequesterId,
            prior: &DeliveryRef,
        ) -> Result<(), DeliveryError> {
            self.inner.lock().calls.push(DeliveryCall::Forward {
                requester: requester.clone(),
                prior: prior.clone(),
            });
            Ok(())
        }

        async fn notify(&self, requester: &RequesterId, text: &str) -> Result<(), DeliveryError> {
            self.inner.lock().calls.push(DeliveryCall::Notify {
                requester: requester.clone(),
                text: text.to_string(),
            });
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{DeliveryCall, FakeDeliveryAdapter};

#[cfg(test)]
#[path = "delivery_tests.rs"]
mod tests;
