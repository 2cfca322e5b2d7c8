// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence collaborator seam.
//!
//! The catalog maps job ids to the names they were uploaded under and
//! remembers, per (job, percentage), the delivery reference of any
//! rendition already produced; the re-render short-circuit reads that.
//! Storage keys are static per supported percentage; a percentage never
//! reaches a query or path unvalidated.

use async_trait::async_trait;
use mg_core::{DeliveryRef, JobId, Percentage};
use thiserror::Error;

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No record for the given job id.
    #[error("unknown job: {0}")]
    UnknownJob(JobId),

    /// The backing store failed.
    #[error("catalog backend error: {0}")]
    Backend(String),
}

/// Adapter for the request/response persistence collaborator.
#[async_trait]
pub trait CatalogAdapter: Clone + Send + Sync + 'static {
    /// Sanitized filename the source was stored under (the name the
    /// renderer's artifacts derive from).
    async fn lookup_source_name(&self, job: &JobId) -> Result<String, CatalogError>;

    /// The name the requester originally uploaded (drives the delivered
    /// filename, extension included).
    async fn lookup_original_name(&self, job: &JobId) -> Result<String, CatalogError>;

    /// Record the transport reference of a delivered rendition.
    async fn record_delivery(
        &self,
        job: &JobId,
        percentage: Percentage,
        delivery_ref: DeliveryRef,
    ) -> Result<(), CatalogError>;

    /// Delivery reference of a previously rendered rendition, if any.
    async fn existing_delivery(
        &self,
        job: &JobId,
        percentage: Percentage,
    ) -> Result<Option<DeliveryRef>, CatalogError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{CatalogAdapter, CatalogError};
    use async_trait::async_trait;
    use mg_core::{DeliveryRef, JobId, Percentage};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeCatalogState {
        source_names: HashMap<JobId, String>,
        original_names: HashMap<JobId, String>,
        deliveries: HashMap<(JobId, Percentage), DeliveryRef>,
    }

    /// In-memory fake catalog for testing.
    #[derive(Clone, Default)]
    pub struct FakeCatalogAdapter {
        inner: Arc<Mutex<FakeCatalogState>>,
    }

    impl FakeCatalogAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a job with its stored and original names.
        pub fn insert_job(&self, job: impl Into<JobId>, source: &str, original: &str) {
            let job = job.into();
            let mut inner = self.inner.lock();
            inner.source_names.insert(job.clone(), source.to_string());
            inner.original_names.insert(job, original.to_string());
        }

        /// Pre-seed a delivered rendition (short-circuit test setup).
        pub fn insert_delivery(
            &self,
            job: impl Into<JobId>,
            percentage: Percentage,
            delivery_ref: DeliveryRef,
        ) {
            self.inner.lock().deliveries.insert((job.into(), percentage), delivery_ref);
        }

        /// Recorded delivery reference, if any.
        pub fn delivery(&self, job: impl Into<JobId>, percentage: Percentage) -> Option<DeliveryRef> {
            self.inner.lock().deliveries.get(&(job.into(), percentage)).cloned()
        }
    }

    #[async_trait]
    impl CatalogAdapter for FakeCatalogAdapter {
        async fn lookup_source_name(&self, job: &JobId) -> Result<String, CatalogError> {
            self.inner
                .lock()
                .source_names
                .get(job)
                .cloned()
                .ok_or_else(|| CatalogError::UnknownJob(job.clone()))
        }

        async fn lookup_original_name(&self, job: &JobId) -> Result<String, CatalogError> {
            self.inner
                .lock()
                .original_names
                .get(job)
                .cloned()
                .ok_or_else(|| CatalogError::UnknownJob(job.clone()))
        }

        async fn record_delivery(
            &self,
            job: &JobId,
            percentage: Percentage,
            delivery_ref: DeliveryRef,
        ) -> Result<(), CatalogError> {
            self.inner.lock().deliveries.insert((job.clone(), percentage), delivery_ref);
            Ok(())
        }

        async fn existing_delivery(
            &self,
            job: &JobId,
            percentage: Percentage,
        ) -> Result<Option<DeliveryRef>, CatalogError> {
            Ok(self.inner.lock().deliveries.get(&(job.clone(), percentage)).cloned())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeCatalogAdapter;

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
