// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! renderd: the renderer half of the decoupled deployment.
//!
//! Watches the shared base directory for `inputSongs…` workspaces,
//! renders each through normalize → separate → mix, and publishes the
//! finished artifact into the matching `sendSongs…` directory for the
//! front-end's completion watcher. The two processes share nothing but
//! the directory tree.

mod env;

use mg_engine::{IntakeScanner, PipelineDriver, Scheduler, Workspaces};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = env::config();
    tracing::info!(
        base = %config.base_dir.display(),
        concurrency = config.concurrency,
        poll_ms = config.poll_interval.as_millis() as u64,
        "renderd starting"
    );

    // Leftovers from a previous run are dead by definition.
    let workspaces = Workspaces::new(config.base_dir.clone());
    let removed = workspaces.sweep_orphans().await;
    if removed > 0 {
        tracing::info!(removed, "removed orphaned workspaces from a previous run");
    }

    let pipeline = PipelineDriver::new(&config);
    let (scheduler, finished_rx) = Scheduler::new(pipeline, config.concurrency);
    let scanner = IntakeScanner::new(&config, scheduler);

    tokio::select! {
        () = scanner.run(finished_rx) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }
}
