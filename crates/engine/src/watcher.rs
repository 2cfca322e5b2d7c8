// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion watcher: filesystem polling over the output namespace.
//!
//! In the decoupled deployment the renderer and the messaging front-end
//! share nothing but a directory tree. The renderer announces a finished
//! job by placing exactly one conventionally-named artifact in a
//! `sendSongs…` directory; this watcher polls for that, delivers, and
//! removes the directory only after the transport accepted the send.
//!
//! Matching is strict: a directory is acted on only when it holds a
//! single file whose name is the expected artifact name for its key (or
//! the requester-facing name left behind by an interrupted send). Extra
//! or oddly-named files mean the renderer may still be writing.

use crate::config::RenderConfig;
use crate::deliver::DeliveryHandoff;
use crate::workspace::Workspaces;
use mg_adapters::{CatalogAdapter, DeliveryAdapter};
use mg_core::naming::{self, CompletionRecord, SEND_PREFIX, WorkspaceKey};
use mg_core::RenderJob;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Polls for finished renders and hands them to delivery.
pub struct CompletionWatcher<C, D> {
    workspaces: Workspaces,
    handoff: DeliveryHandoff<C, D>,
    poll_interval: Duration,
    /// Expected artifact name per output directory, resolved from the
    /// catalog once and reused across polls.
    expected: Mutex<HashMap<String, String>>,
}

impl<C: CatalogAdapter, D: DeliveryAdapter> CompletionWatcher<C, D> {
    pub fn new(config: &RenderConfig, catalog: C, delivery: D) -> Self {
        Self {
            workspaces: Workspaces::new(config.base_dir.clone()),
            handoff: DeliveryHandoff::new(catalog, delivery),
            poll_interval: config.poll_interval,
            expected: Mutex::new(HashMap::new()),
        }
    }

    /// Poll until the task is dropped.
    pub async fn run(&self) {
        loop {
            self.poll_once().await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// One scan of the base directory. Returns how many renders were
    /// delivered.
    pub async fn poll_once(&self) -> usize {
        let mut delivered = 0;
        let mut entries = match tokio::fs::read_dir(self.workspaces.base_dir()).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "completion watch: cannot list base dir");
                return 0;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(key) = WorkspaceKey::parse(SEND_PREFIX, name) else { continue };
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let Some(record) = self.inspect(&dir, name, key).await else { continue };
            if self.dispatch(record).await {
                self.expected.lock().remove(name);
                delivered += 1;
            }
        }
        delivered
    }

    /// Decide whether a matched directory holds a finished render:
    /// exactly one file, bearing the expected name.
    async fn inspect(
        &self,
        dir: &Path,
        dir_name: &str,
        key: WorkspaceKey,
    ) -> Option<CompletionRecord> {
        let expected = match self.expected_name(dir_name, &key).await {
            Some(expected) => expected,
            None => return None,
        };

        let mut entries = tokio::fs::read_dir(dir).await.ok()?;
        let mut sole_file = None;
        let mut count = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            count += 1;
            if count > 1 {
                return None;
            }
            sole_file = Some(entry);
        }
        let entry = sole_file?;
        let file_name = entry.file_name();
        let file_name = file_name.to_str()?;
        if file_name != expected && !naming::is_delivered_name(file_name) {
            return None;
        }
        Some(CompletionRecord {
            key,
            artifact_path: entry.path(),
            dir_path: dir.to_path_buf(),
        })
    }

    async fn expected_name(&self, dir_name: &str, key: &WorkspaceKey) -> Option<String> {
        if let Some(expected) = self.expected.lock().get(dir_name) {
            return Some(expected.clone());
        }
        let source = match self.handoff.catalog().lookup_source_name(&key.job_id).await {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(dir = dir_name, error = %e, "no catalog record for output dir");
                return None;
            }
        };
        let expected = naming::expected_artifact_name(&source, key.percentage);
        self.expected.lock().insert(dir_name.to_string(), expected.clone());
        Some(expected)
    }

    /// Send one finished render. The directory is removed only after the
    /// transport accepted it; on failure everything stays for the next
    /// poll.
    async fn dispatch(&self, record: CompletionRecord) -> bool {
        let job = RenderJob::new(
            record.key.job_id.clone(),
            record.key.requester_id.clone(),
            record.key.percentage,
            record.artifact_path.clone(),
        );
        match self.handoff.deliver(&job, &record.artifact_path).await {
            Ok(_) => {
                if let Err(e) = self.workspaces.release(&record.dir_path).await {
                    tracing::warn!(dir = %record.dir_path.display(), error = %e, "delivered but could not remove output dir");
                }
                true
            }
            Err(e) => {
                tracing::warn!(
                    job_id = %job.id,
                    dir = %record.dir_path.display(),
                    error = %e,
                    "delivery failed; leaving artifact for the next poll"
                );
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
