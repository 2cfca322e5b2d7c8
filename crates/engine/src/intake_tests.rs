// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::RenderError;
use crate::test_support::{fake_pipeline, FakePipeline};
use mg_core::{JobState, RenderJob};
use std::path::Path;
use std::time::Duration;

struct Fixture {
    base: tempfile::TempDir,
    pipeline: Arc<FakePipeline>,
    scanner: IntakeScanner<Arc<FakePipeline>>,
    finished_rx: mpsc::UnboundedReceiver<Finished>,
}

fn fixture() -> Fixture {
    let base = tempfile::tempdir().unwrap();
    let pipeline = fake_pipeline();
    let (scheduler, finished_rx) = Scheduler::new(pipeline.clone(), 2);
    let config = RenderConfig::default().base_dir(base.path());
    let scanner = IntakeScanner::new(&config, scheduler);
    Fixture { base, pipeline, scanner, finished_rx }
}

fn input_dir(base: &Path, name: &str, file: Option<&str>) -> PathBuf {
    let dir = base.join(name);
    std::fs::create_dir(&dir).unwrap();
    if let Some(file) = file {
        std::fs::write(dir.join(file), b"audio").unwrap();
    }
    dir
}

#[tokio::test]
async fn ready_dirs_are_submitted_exactly_once() {
    let mut fx = fixture();
    fx.pipeline.gate_runs();
    input_dir(fx.base.path(), "inputSongs15:42:7", Some("track.mp3"));
    input_dir(fx.base.path(), "inputSongs0:43:7", Some("other.wav"));

    assert_eq!(fx.scanner.scan_once().await, 2);
    // Both jobs are in flight; a second scan re-sees the same dirs.
    assert_eq!(fx.scanner.scan_once().await, 0);

    fx.pipeline.release(2);
    for _ in 0..2 {
        let finished = tokio::time::timeout(Duration::from_secs(5), fx.finished_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(finished.result.is_ok());
    }
    assert_eq!(fx.pipeline.starts().len(), 2);
}

#[tokio::test]
async fn empty_ambiguous_and_non_audio_dirs_are_skipped() {
    let fx = fixture();
    input_dir(fx.base.path(), "inputSongs15:42:7", None);
    input_dir(fx.base.path(), "inputSongs15:44:7", Some("notes.txt"));
    input_dir(fx.base.path(), "unrelated", Some("track.mp3"));
    // Two audio files: never guess which one was meant.
    let two = input_dir(fx.base.path(), "inputSongs15:45:7", Some("a.mp3"));
    std::fs::write(two.join("b.mp3"), b"audio").unwrap();

    assert_eq!(fx.scanner.scan_once().await, 0);
    assert!(fx.pipeline.starts().is_empty());
}

#[tokio::test]
async fn finished_artifact_is_published_to_the_send_dir() {
    let fx = fixture();
    let work = input_dir(fx.base.path(), "inputSongs15:42:7", Some("track.mp3"));
    let artifact = work.join("track_accompaniment_15percent_320k.mp3");
    std::fs::write(&artifact, b"mp3").unwrap();

    let mut job = RenderJob::builder().workspace_path(&work).build();
    job.state = JobState::Mixing;
    fx.scanner
        .handle_finished(Finished {
            job,
            result: Ok(PipelineOutput { artifact: artifact.clone(), workspace: work.clone() }),
        })
        .await;

    let send = fx.base.path().join("sendSongs15:42:7");
    assert!(send.join("track_accompaniment_15percent_320k.mp3").exists());
    assert!(!work.exists());
}

#[tokio::test]
async fn finishing_clears_inflight_so_the_dir_can_be_resubmitted() {
    let fx = fixture();
    fx.pipeline.gate_runs();
    let work = input_dir(fx.base.path(), "inputSongs15:42:7", Some("track.mp3"));

    assert_eq!(fx.scanner.scan_once().await, 1);
    assert_eq!(fx.scanner.scan_once().await, 0);

    // A failed render releases its workspace itself; only the inflight
    // mark remains to clear.
    std::fs::remove_dir_all(&work).unwrap();
    let mut job = RenderJob::builder().build();
    job.fail();
    fx.scanner
        .handle_finished(Finished {
            job,
            result: Err(RenderError::InputNotFound { base: "track".to_string() }),
        })
        .await;

    input_dir(fx.base.path(), "inputSongs15:42:7", Some("track.mp3"));
    assert_eq!(fx.scanner.scan_once().await, 1);
    fx.pipeline.release(2);
}
