// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hardened systemd unit generation (spec §4.3.2). A compromised
//! application process should not be able to touch the rest of the host
//! even with arbitrary code execution inside its own jail.

use std::path::{Path, PathBuf};

use kari_core::AgentError;

#[derive(Debug, Clone)]
pub struct ServiceUnitSpec {
    pub app_id: String,
    pub username: String,
    pub app_dir: PathBuf,
    pub exec_start: String,
    pub port: u16,
}

/// Directives every generated unit carries regardless of application, on
/// top of the per-app `User=`/`ExecStart=`/`WorkingDirectory=`.
const HARDENING: &[&str] = &[
    "ProtectSystem=strict",
    "PrivateTmp=yes",
    "NoNewPrivileges=yes",
    "PrivateDevices=yes",
    "ProtectHome=yes",
    "RestrictAddressFamilies=AF_INET AF_INET6 AF_UNIX",
];

pub fn render(spec: &ServiceUnitSpec) -> String {
    let mut unit = String::new();
    unit.push_str("[Unit]\n");
    unit.push_str(&format!("Description=kari application {}\n", spec.app_id));
    unit.push_str("After=network.target\n\n");

    unit.push_str("[Service]\n");
    unit.push_str(&format!("User={}\n", spec.username));
    unit.push_str(&format!("WorkingDirectory={}\n", spec.app_dir.join("current").display()));
    unit.push_str(&format!("ExecStart={}\n", spec.exec_start));
    unit.push_str(&format!("Environment=PORT={}\n", spec.port));
    unit.push_str("Restart=on-failure\n");
    for directive in HARDENING {
        unit.push_str(directive);
        unit.push('\n');
    }
    unit.push('\n');

    unit.push_str("[Install]\n");
    unit.push_str("WantedBy=multi-user.target\n");
    unit
}

pub fn unit_path(services_root: &Path, app_id: &str) -> PathBuf {
    services_root.join(format!("kari-{app_id}.service"))
}

/// Render and atomically install the unit file. Does not reload or (re)start
/// the service; callers issue those through the platform's service manager
/// after installation succeeds.
pub async fn install(services_root: &Path, spec: &ServiceUnitSpec) -> Result<PathBuf, AgentError> {
    let contents = render(spec);
    let path = unit_path(services_root, &spec.app_id);
    kari_exec::write_atomic(&path, 0o644, contents.as_bytes())
        .await
        .map_err(|e| AgentError::Internal(format!("install unit for {}: {e}", spec.app_id)))?;
    Ok(path)
}

#[cfg(test)]
#[path = "unit_tests.rs"]
mod tests;
