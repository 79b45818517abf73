// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Release directory management and symlink-aware pruning (spec §4.3.3).

use std::path::{Path, PathBuf};

use kari_core::{AgentError, ReleaseName};

const CURRENT_LINK: &str = "current";
const RELEASES_DIR: &str = "releases";

pub fn releases_dir(app_dir: &Path) -> PathBuf {
    app_dir.join(RELEASES_DIR)
}

pub fn release_dir(app_dir: &Path, release: ReleaseName) -> PathBuf {
    releases_dir(app_dir).join(release.as_str())
}

/// Point `current` at `release` via a staged-symlink-then-rename, never
/// unlink-then-symlink. The staged name sits beside `current` so the rename
/// stays within one filesystem.
pub async fn activate_release(app_dir: &Path, release: ReleaseName) -> Result<(), AgentError> {
    let current = app_dir.join(CURRENT_LINK);
    let staged = app_dir.join(".current.tmp");
    let target = PathBuf::from(RELEASES_DIR).join(release.as_str());

    let _ = tokio::fs::remove_file(&staged).await;
    tokio::fs::symlink(&target, &staged)
        .await
        .map_err(|e| AgentError::Internal(format!("stage current symlink: {e}")))?;
    kari_exec::atomic_rename(&staged, &current)
        .await
        .map_err(|e| AgentError::Internal(format!("swap current symlink: {e}")))
}

/// Resolve `current` to the [`ReleaseName`] it points at. Returns `None` if
/// the app has never been activated (no `current` link yet).
pub async fn current_release(app_dir: &Path) -> Result<Option<ReleaseName>, AgentError> {
    let current = app_dir.join(CURRENT_LINK);
    match tokio::fs::read_link(&current).await {
        Ok(target) => {
            let name = target
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| AgentError::Integrity("current symlink has no file name".into()))?;
            ReleaseName::parse(name)
                .map(Some)
                .map_err(|e| AgentError::Integrity(format!("current points at malformed release: {e}")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AgentError::Internal(format!("read current symlink: {e}"))),
    }
}

/// Applies the pruning algorithm from spec §4.3.3: keep the `keep` most
/// recent releases plus whatever `current` resolves to (even if that falls
/// outside the most-recent window, as happens right after a rollback), and
/// delete the rest. Returns the names actually deleted.
pub async fn prune(app_dir: &Path, keep: usize) -> Result<Vec<ReleaseName>, AgentError> {
    let live = current_release(app_dir).await?;

    let releases_root = releases_dir(app_dir);
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(&releases_root)
        .await
        .map_err(|e| AgentError::Internal(format!("list releases: {e}")))?;
    while let Some(entry) =
        entries.next_entry().await.map_err(|e| AgentError::Internal(format!("list releases: {e}")))?
    {
        if let Some(name) = entry.file_name().to_str().and_then(|s| ReleaseName::parse(s).ok()) {
            names.push(name);
        }
    }
    names.sort_unstable_by(|a, b| b.cmp(a));

    let mut to_keep: std::collections::HashSet<ReleaseName> =
        names.iter().take(keep).copied().collect();
    if let Some(live) = live {
        to_keep.insert(live);
    }

    let mut deleted = Vec::new();
    for name in names {
        if to_keep.contains(&name) {
            continue;
        }
        let dir = release_dir(app_dir, name);
        tokio::fs::remove_dir_all(&dir)
            .await
            .map_err(|e| AgentError::Internal(format!("prune {}: {e}", name.as_str())))?;
        deleted.push(name);
    }
    Ok(deleted)
}

#[cfg(test)]
#[path = "release_tests.rs"]
mod tests;
