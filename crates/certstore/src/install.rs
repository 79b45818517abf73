// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `InstallCertificate` (spec §4.3.4). Every step happens in the exact
//! order the spec prescribes; the private key is zeroized in-process before
//! this function returns, not on some later drop.

use std::path::{Path, PathBuf};

use kari_core::{AgentError, CertificateMaterial};

use crate::locks::DomainLocks;

const PRIVKEY_MODE: u32 = 0o600;
const FULLCHAIN_MODE: u32 = 0o644;

pub fn domain_dir(cert_root: &Path, domain: &str) -> PathBuf {
    cert_root.join(domain)
}

/// Installs `material` under `cert_root` and zeroizes its private-key
/// buffer before returning, whether installation succeeded or failed.
pub async fn install(
    cert_root: &Path,
    locks: &DomainLocks,
    material: &mut CertificateMaterial,
) -> Result<(), AgentError> {
    let _guard = locks.lock(&material.domain).await;
    let result = install_locked(cert_root, material).await;
    material.privkey_pem.zeroize_now();
    result
}

async fn install_locked(cert_root: &Path, material: &CertificateMaterial) -> Result<(), AgentError> {
    let dir = domain_dir(cert_root, &material.domain);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AgentError::Internal(format!("create cert dir for {}: {e}", material.domain)))?;

    let privkey_path = dir.join("privkey.pem");
    // Re-issue/renewal overwrites a previous key; create-exclusive still
    // guarantees there is never a window where the new file exists with a
    // mode broader than 0600.
    let _ = tokio::fs::remove_file(&privkey_path).await;
    kari_exec::create_with_mode(&privkey_path, PRIVKEY_MODE, material.privkey_pem.as_bytes())
        .await
        .map_err(|e| AgentError::Internal(format!("write privkey for {}: {e}", material.domain)))?;

    let fullchain_path = dir.join("fullchain.pem");
    let _ = tokio::fs::remove_file(&fullchain_path).await;
    kari_exec::create_with_mode(&fullchain_path, FULLCHAIN_MODE, &material.fullchain_pem)
        .await
        .map_err(|e| AgentError::Internal(format!("write fullchain for {}: {e}", material.domain)))?;

    Ok(())
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
