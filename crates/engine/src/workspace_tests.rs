// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mg_core::{JobId, Percentage, RequesterId};

fn key() -> WorkspaceKey {
    WorkspaceKey::new(Percentage::Fifteen, JobId::new("42"), RequesterId::new("7"))
}

#[tokio::test]
async fn acquire_creates_conventionally_named_dir() {
    let base = tempfile::tempdir().unwrap();
    let workspaces = Workspaces::new(base.path());

    let path = workspaces.acquire(&key()).await.unwrap();

    assert_eq!(path, base.path().join("inputSongs15:42:7"));
    assert!(path.is_dir());
}

#[tokio::test]
async fn acquire_is_idempotent() {
    let base = tempfile::tempdir().unwrap();
    let workspaces = Workspaces::new(base.path());

    let a = workspaces.acquire(&key()).await.unwrap();
    let b = workspaces.acquire(&key()).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn release_removes_dir_and_contents() {
    let base = tempfile::tempdir().unwrap();
    let workspaces = Workspaces::new(base.path());

    let path = workspaces.acquire(&key()).await.unwrap();
    tokio::fs::write(path.join("track.wav"), b"data").await.unwrap();

    workspaces.release(&path).await.unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn release_of_missing_dir_is_ok() {
    let base = tempfile::tempdir().unwrap();
    let workspaces = Workspaces::new(base.path());
    workspaces.release(&base.path().join("inputSongs15:42:7")).await.unwrap();
}

#[tokio::test]
async fn sweep_removes_only_workspace_dirs() {
    let base = tempfile::tempdir().unwrap();
    let workspaces = Workspaces::new(base.path());

    tokio::fs::create_dir(base.path().join("inputSongs15:42:7")).await.unwrap();
    tokio::fs::create_dir(base.path().join("sendSongs0:9:3")).await.unwrap();
    // Not matching the convention: must survive the sweep.
    tokio::fs::create_dir(base.path().join("inputSongsStuff")).await.unwrap();
    tokio::fs::create_dir(base.path().join("library")).await.unwrap();
    tokio::fs::write(base.path().join("sendSongs15:1:2"), b"a file, not a dir").await.unwrap();

    let removed = workspaces.sweep_orphans().await;

    assert_eq!(removed, 2);
    assert!(!base.path().join("inputSongs15:42:7").exists());
    assert!(!base.path().join("sendSongs0:9:3").exists());
    assert!(base.path().join("inputSongsStuff").exists());
    assert!(base.path().join("library").exists());
    assert!(base.path().join("sendSongs15:1:2").exists());
}
