// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::os::unix::fs::PermissionsExt;

use tempfile::tempdir;

use super::*;

#[tokio::test]
async fn create_with_mode_sets_permissions_at_open_time() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("secret");
    create_with_mode(&path, 0o600, b"hunter2").await.unwrap();

    let meta = tokio::fs::metadata(&path).await.unwrap();
    assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"hunter2");
}

#[tokio::test]
async fn create_with_mode_fails_if_file_exists() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("secret");
    create_with_mode(&path, 0o600, b"first").await.unwrap();
    let err = create_with_mode(&path, 0o600, b"second").await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn write_atomic_replaces_existing_file_and_leaves_no_temp() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vhost.conf");
    write_atomic(&path, 0o644, b"v1").await.unwrap();
    write_atomic(&path, 0o644, b"v2").await.unwrap();

    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"v2");
    let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.unwrap() {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    assert_eq!(names, vec!["vhost.conf"]);
}

#[tokio::test]
async fn create_dir_with_mode_applies_mode_and_creates_missing_parents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a/b/c");
    create_dir_with_mode(&path, 0o750).await.unwrap();

    let meta = tokio::fs::metadata(&path).await.unwrap();
    assert!(meta.is_dir());
    assert_eq!(meta.permissions().mode() & 0o777, 0o750);
}

#[tokio::test]
async fn atomic_rename_replaces_destination() {
    let dir = tempdir().unwrap();
    let from = dir.path().join("new");
    let dest = dir.path().join("current");
    tokio::fs::write(&from, b"new-target").await.unwrap();
    tokio::fs::write(&dest, b"old-target").await.unwrap();

    atomic_rename(&from, &dest).await.unwrap();
    assert_eq!(tokio::fs::read(&dest).await.unwrap(), b"new-target");
    assert!(!from.exists());
}
