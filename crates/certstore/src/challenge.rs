// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ACME HTTP-01 challenge file handling (spec §4.3.5).

use std::path::{Path, PathBuf};

use kari_core::{AgentError, ChallengeIntent};
use kari_exec::{Argv, RunAs};

const CHALLENGE_MODE: u32 = 0o644;

fn challenge_path(web_root: &Path, intent: &ChallengeIntent) -> PathBuf {
    web_root.join(intent.relative_path())
}

/// Writes `key_authorization` under `<web_root>/.well-known/acme-challenge/`,
/// owned by the configured web user:group. Token validation happens here
/// too, not only at the RPC boundary, so this function is safe to call
/// directly from tests or a future caller that skips the wire layer.
pub async fn present(
    web_root: &Path,
    web_user: &str,
    web_group: &str,
    intent: &ChallengeIntent,
) -> Result<(), AgentError> {
    ChallengeIntent::validate_token(&intent.token)?;
    let path = challenge_path(web_root, intent);
    let parent = path
        .parent()
        .ok_or_else(|| AgentError::Internal("challenge path has no parent".into()))?;
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| AgentError::Internal(format!("create challenge dir: {e}")))?;

    let _ = tokio::fs::remove_file(&path).await;
    kari_exec::create_with_mode(&path, CHALLENGE_MODE, intent.key_authorization.as_bytes())
        .await
        .map_err(|e| AgentError::Internal(format!("write challenge file: {e}")))?;

    let owner = format!("{web_user}:{web_group}");
    kari_exec::run_checked(&Argv::new("chown").arg(&owner).arg(path.to_string_lossy().into_owned()), &RunAs::default())
        .await
        .map_err(|e| AgentError::Internal(format!("chown challenge file to {owner}: {e}")))?;
    Ok(())
}

/// Removes exactly the one file this token names. No globbing, no
/// recursion — a leftover challenge from a different token is never
/// touched, and cleanup of an already-absent file is not an error.
pub async fn cleanup(web_root: &Path, intent: &ChallengeIntent) -> Result<(), AgentError> {
    ChallengeIntent::validate_token(&intent.token)?;
    let path = challenge_path(web_root, intent);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AgentError::Internal(format!("remove challenge file: {e}"))),
    }
}

#[cfg(test)]
#[path = "challenge_tests.rs"]
mod tests;
