// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem primitives the jail and certificate stores share: a file's
//! mode is fixed at creation rather than patched afterward, and a
//! configuration swap is a single rename rather than unlink-then-link (spec
//! §4.3.3, §4.3.4). Both make a crash mid-write leave either the old file or
//! the new one intact, never a partially written one.

use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Create `path` with `mode` applied at `open(2)` time and write `contents`
/// to it. Fails if `path` already exists — callers that want to replace an
/// existing file write to a sibling temp path and call [`atomic_rename`]
/// instead of overwriting in place.
pub async fn create_with_mode(path: &Path, mode: u32, contents: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true).mode(mode);
    let mut file = options.open(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}

/// Write `contents` to a temp sibling of `dest` and atomically rename it
/// into place. `dest`'s final mode is `mode`, independent of whatever the
/// temp file inherited from `umask`.
pub async fn write_atomic(dest: &Path, mode: u32, contents: &[u8]) -> io::Result<()> {
    let parent = dest.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent directory")
    })?;
    let tmp_name = format!(
        ".{}.tmp-{}",
        dest.file_name().and_then(|n| n.to_str()).unwrap_or("file"),
        std::process::id()
    );
    let tmp_path = parent.join(tmp_name);

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true).mode(mode);
    let mut file = options.open(&tmp_path).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    match atomic_rename(&tmp_path, dest).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp_path).await;
            Err(e)
        }
    }
}

/// `rename(2)` is atomic within a filesystem; readers either see the old
/// file or the new one, never a half-written one. `from` and `dest` must be
/// on the same filesystem for the atomicity guarantee to hold.
pub async fn atomic_rename(from: &Path, dest: &Path) -> io::Result<()> {
    fs::rename(from, dest).await
}

/// Creates `path` (and any missing parents) with `mode` applied at creation
/// time, the directory counterpart to [`create_with_mode`]. Runs on the
/// blocking pool since `std::fs::DirBuilder` has no async equivalent.
pub async fn create_dir_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || std::fs::DirBuilder::new().mode(mode).recursive(true).create(&path))
        .await
        .map_err(|e| io::Error::other(e.to_string()))?
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
