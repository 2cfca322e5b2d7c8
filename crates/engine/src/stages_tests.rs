// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;

fn config_with(ffmpeg: &Path, separator: &Path) -> RenderConfig {
    RenderConfig::default()
        .ffmpeg_bin(ffmpeg.to_string_lossy().to_string())
        .separator_bin(separator.to_string_lossy().to_string())
        .tool_timeout(Duration::from_secs(5))
}

/// Writes an executable shell script and returns its path.
fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A tool that creates its final argument, like ffmpeg writing its output.
fn touch_last_tool(dir: &Path, name: &str) -> PathBuf {
    script(dir, name, "for last in \"$@\"; do :; done\ntouch \"$last\"")
}

#[test]
fn normalize_args_decode_to_wav() {
    let args = normalize_args(Path::new("/w/track.mp3"), Path::new("/w/track.wav"));
    assert_eq!(args, vec!["-y", "-i", "/w/track.mp3", "/w/track.wav"]);
}

#[test]
fn separate_args_use_two_stem_model() {
    let args = separate_args(Path::new("/w"), Path::new("/w/track.wav"));
    assert_eq!(
        args,
        vec!["separate", "-p", "spleeter:2stems", "-o", "/w", "/w/track.wav"]
    );
}

#[test]
fn encode_args_target_320k_mp3() {
    let args = encode_args(
        Path::new("/w/track/accompaniment.wav"),
        Path::new("/w/track_minus_320k.mp3"),
    );
    assert_eq!(
        args,
        vec![
            "-y",
            "-i",
            "/w/track/accompaniment.wav",
            "-c:a",
            "libmp3lame",
            "-b:a",
            "320k",
            "/w/track_minus_320k.mp3",
        ]
    );
}

#[test]
fn mix_args_attenuate_vocals_linearly() {
    let args = mix_args(
        Path::new("/w/track/accompaniment.wav"),
        Path::new("/w/track/vocals.wav"),
        Percentage::Fifteen.gain(),
        Path::new("/w/track_accompaniment_15percent_320k.mp3"),
    );
    assert_eq!(
        args,
        vec![
            "-y",
            "-i",
            "/w/track/accompaniment.wav",
            "-i",
            "/w/track/vocals.wav",
            "-filter_complex",
            "[0:a]volume=1[a];[1:a]volume=0.15[v];[a][v]amix=inputs=2:duration=longest",
            "-c:a",
            "libmp3lame",
            "-q:a",
            "0",
            "/w/track_accompaniment_15percent_320k.mp3",
        ]
    );
}

#[yare::parameterized(
    fifteen = { Percentage::Fifteen, "0.15" },
    fifty = { Percentage::Fifty, "0.5" },
)]
fn mix_filter_scales_vocals_by_percentage(percentage: Percentage, gain: &str) {
    let args = mix_args(
        Path::new("/w/t/accompaniment.wav"),
        Path::new("/w/t/vocals.wav"),
        percentage.gain(),
        Path::new("/w/out.mp3"),
    );
    let filter = args[6].to_str().unwrap();
    assert_eq!(
        filter,
        format!("[0:a]volume=1[a];[1:a]volume={gain}[v];[a][v]amix=inputs=2:duration=longest")
    );
}

#[tokio::test]
async fn normalize_produces_wav_intermediate() {
    let work = tempfile::tempdir().unwrap();
    let ffmpeg = touch_last_tool(work.path(), "fake-ffmpeg");
    let runner = StageRunner::new(&config_with(&ffmpeg, Path::new("unused")));

    let source = work.path().join("track.mp3");
    std::fs::write(&source, b"mp3").unwrap();

    let out = runner.normalize(work.path(), &source, "track").await.unwrap();
    assert_eq!(out, work.path().join("track.wav"));
    assert!(out.exists());
}

#[tokio::test]
async fn wav_input_passes_through_without_running_a_tool() {
    let work = tempfile::tempdir().unwrap();
    // Binary that cannot exist: the passthrough must not spawn anything.
    let runner =
        StageRunner::new(&config_with(Path::new("/nonexistent/ffmpeg"), Path::new("unused")));

    let source = work.path().join("track.wav");
    std::fs::write(&source, b"pcm").unwrap();

    let out = runner.normalize(work.path(), &source, "track").await.unwrap();
    assert_eq!(out, source);
}

#[tokio::test]
async fn separate_returns_accompaniment_stem() {
    let work = tempfile::tempdir().unwrap();
    // Fifth positional arg is the output dir; emit both stems under it.
    let separator = script(
        work.path(),
        "fake-separator",
        "mkdir -p \"$5/track\"\ntouch \"$5/track/accompaniment.wav\" \"$5/track/vocals.wav\"",
    );
    let runner = StageRunner::new(&config_with(Path::new("unused"), &separator));

    let wav = work.path().join("track.wav");
    std::fs::write(&wav, b"pcm").unwrap();

    let out = runner.separate(work.path(), &wav, "track").await.unwrap();
    assert_eq!(out, work.path().join("track").join("accompaniment.wav"));
    assert!(work.path().join("track").join("vocals.wav").exists());
}

#[tokio::test]
async fn mix_at_zero_percent_emits_minus_artifact() {
    let work = tempfile::tempdir().unwrap();
    let ffmpeg = touch_last_tool(work.path(), "fake-ffmpeg");
    let runner = StageRunner::new(&config_with(&ffmpeg, Path::new("unused")));

    std::fs::create_dir(work.path().join("track")).unwrap();
    std::fs::write(work.path().join("track").join("accompaniment.wav"), b"a").unwrap();

    let out = runner.mix(work.path(), "track", Percentage::Zero).await.unwrap();
    assert_eq!(out, work.path().join("track_minus_320k.mp3"));
}

#[tokio::test]
async fn mix_at_fifteen_percent_emits_remix_artifact() {
    let work = tempfile::tempdir().unwrap();
    let ffmpeg = touch_last_tool(work.path(), "fake-ffmpeg");
    let runner = StageRunner::new(&config_with(&ffmpeg, Path::new("unused")));

    std::fs::create_dir(work.path().join("track")).unwrap();
    std::fs::write(work.path().join("track").join("accompaniment.wav"), b"a").unwrap();
    std::fs::write(work.path().join("track").join("vocals.wav"), b"v").unwrap();

    let out = runner.mix(work.path(), "track", Percentage::Fifteen).await.unwrap();
    assert_eq!(out, work.path().join("track_accompaniment_15percent_320k.mp3"));
}

#[tokio::test]
async fn mix_without_vocal_stem_is_artifact_not_produced() {
    let work = tempfile::tempdir().unwrap();
    let ffmpeg = touch_last_tool(work.path(), "fake-ffmpeg");
    let runner = StageRunner::new(&config_with(&ffmpeg, Path::new("unused")));

    std::fs::create_dir(work.path().join("track")).unwrap();
    std::fs::write(work.path().join("track").join("accompaniment.wav"), b"a").unwrap();

    let err = runner.mix(work.path(), "track", Percentage::Fifty).await.unwrap_err();
    assert!(matches!(err, StageError::ArtifactNotProduced { .. }));
}

#[tokio::test]
async fn missing_binary_is_tool_missing() {
    let work = tempfile::tempdir().unwrap();
    let config = config_with(Path::new("/nonexistent/ffmpeg"), Path::new("unused"));
    let runner = StageRunner::new(&config);

    let source = work.path().join("track.mp3");
    std::fs::write(&source, b"mp3").unwrap();

    let err = runner.normalize(work.path(), &source, "track").await.unwrap_err();
    assert!(matches!(err, StageError::ToolMissing { .. }));
}

#[tokio::test]
async fn nonzero_exit_carries_code_and_stderr() {
    let work = tempfile::tempdir().unwrap();
    let ffmpeg = script(work.path(), "fake-ffmpeg", "echo boom >&2\nexit 3");
    let runner = StageRunner::new(&config_with(&ffmpeg, Path::new("unused")));

    let source = work.path().join("track.mp3");
    std::fs::write(&source, b"mp3").unwrap();

    let err = runner.normalize(work.path(), &source, "track").await.unwrap_err();
    match err {
        StageError::ToolNonZeroExit { code, stderr, .. } => {
            assert_eq!(code, 3);
            assert_eq!(stderr, "boom");
        }
        other => panic!("expected non-zero exit, got {other:?}"),
    }
}

#[tokio::test]
async fn silent_success_without_artifact_is_rejected() {
    let work = tempfile::tempdir().unwrap();
    let ffmpeg = script(work.path(), "fake-ffmpeg", "exit 0");
    let runner = StageRunner::new(&config_with(&ffmpeg, Path::new("unused")));

    let source = work.path().join("track.mp3");
    std::fs::write(&source, b"mp3").unwrap();

    let err = runner.normalize(work.path(), &source, "track").await.unwrap_err();
    assert!(matches!(err, StageError::ArtifactNotProduced { .. }));
}

#[tokio::test]
async fn wedged_tool_times_out() {
    let work = tempfile::tempdir().unwrap();
    let ffmpeg = script(work.path(), "fake-ffmpeg", "sleep 30");
    let config = config_with(&ffmpeg, Path::new("unused"))
        .tool_timeout(Duration::from_millis(100));
    let runner = StageRunner::new(&config);

    let source = work.path().join("track.mp3");
    std::fs::write(&source, b"mp3").unwrap();

    let err = runner.normalize(work.path(), &source, "track").await.unwrap_err();
    assert!(err.is_timeout());
}
