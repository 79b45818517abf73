// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tempfile::tempdir;

use super::*;

#[tokio::test]
async fn counting_units_in_a_missing_directory_is_zero_not_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    assert_eq!(count_installed_units(&missing).await.unwrap(), 0);
}

#[tokio::test]
async fn only_kari_service_files_are_counted() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("kari-app-1.service"), "").unwrap();
    std::fs::write(dir.path().join("kari-app-2.service"), "").unwrap();
    std::fs::write(dir.path().join("nginx.service"), "").unwrap();
    assert_eq!(count_installed_units(dir.path()).await.unwrap(), 2);
}

#[tokio::test]
async fn system_status_reports_a_distro_and_nonzero_rss() {
    let dir = tempdir().unwrap();
    let status = get_system_status(dir.path()).await.unwrap();
    assert!(!status.distro.is_empty());
    assert!(status.rss_bytes > 0, "this test process itself has nonzero RSS");
}
