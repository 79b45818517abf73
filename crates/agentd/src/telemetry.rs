// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host introspection backing `RunSystemCheck` and `GetSystemStatus` (spec
//! §3, §4.1). Every external fact is read through `kari_exec` or a plain
//! file read — never shelled out as an interpolated string.

use std::collections::HashMap;

use kari_core::{AgentError, SystemCheckReport};
use kari_exec::{Argv, RunAs};

const MONITORED_SERVICES: &[&str] = &["nginx", "postgresql"];

fn os_release() -> (String, String) {
    let contents = std::fs::read_to_string("/etc/os-release").unwrap_or_default();
    let mut distro = "unknown".to_string();
    let mut version = "unknown".to_string();
    for line in contents.lines() {
        if let Some(value) = line.strip_prefix("ID=") {
            distro = value.trim_matches('"').to_string();
        } else if let Some(value) = line.strip_prefix("VERSION_ID=") {
            version = value.trim_matches('"').to_string();
        }
    }
    (distro, version)
}

async fn service_status(service_manager: &str, unit: &str) -> String {
    match kari_exec::run(&Argv::new(service_manager).args(["is-active", unit]), &RunAs::default()).await {
        Ok(output) => String::from_utf8_lossy(&output.stdout).trim().to_string(),
        Err(_) => "unknown".to_string(),
    }
}

async fn firewall_status(firewall_program: &str) -> (String, String) {
    match kari_exec::run(&Argv::new(firewall_program).arg("status"), &RunAs::default()).await {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let status = if stdout.to_lowercase().contains("status: active") { "active" } else { "inactive" };
            (firewall_program.to_string(), status.to_string())
        }
        Err(_) => (firewall_program.to_string(), "unknown".to_string()),
    }
}

/// Gathers the full report an operator needs to decide whether a host is
/// eligible for onboarding (spec §3).
pub async fn run_system_check(service_manager: &str, firewall_program: &str) -> SystemCheckReport {
    let (distro, version) = os_release();
    let mut services = HashMap::new();
    for service in MONITORED_SERVICES {
        services.insert((*service).to_string(), service_status(service_manager, service).await);
    }
    let (firewall_type, firewall_status) = firewall_status(firewall_program).await;
    SystemCheckReport { distro, version, services, firewall_type, firewall_status }
}

/// Telemetry snapshot backing `GetSystemStatus`. Counts installed units
/// matching the `kari-*.service` naming convention as the active-jail count
/// rather than querying the service manager for running state, since a
/// jailed app installed but momentarily stopped is still "active" in the
/// sense this RPC reports on.
pub struct SystemStatus {
    pub distro: String,
    pub cpu_percent: f32,
    pub rss_bytes: u64,
    pub active_jail_count: u32,
}

pub async fn get_system_status(services_root: &std::path::Path) -> Result<SystemStatus, AgentError> {
    let (distro, _version) = os_release();
    let cpu_percent = load_average_percent();
    let rss_bytes = self_rss_bytes();
    let active_jail_count = count_installed_units(services_root).await?;
    Ok(SystemStatus { distro, cpu_percent, rss_bytes, active_jail_count })
}

/// A coarse CPU-load proxy: the 1-minute load average as a percentage of
/// a single core. Good enough for a health heuristic; not a precise
/// per-core utilization figure.
fn load_average_percent() -> f32 {
    let contents = match std::fs::read_to_string("/proc/loadavg") {
        Ok(c) => c,
        Err(_) => return 0.0,
    };
    contents.split_whitespace().next().and_then(|s| s.parse::<f32>().ok()).map(|load| load * 100.0).unwrap_or(0.0)
}

fn self_rss_bytes() -> u64 {
    let contents = match std::fs::read_to_string("/proc/self/status") {
        Ok(c) => c,
        Err(_) => return 0,
    };
    for line in contents.lines() {
        if let Some(value) = line.strip_prefix("VmRSS:") {
            if let Some(kb) = value.trim().strip_suffix("kB").map(|s| s.trim()) {
                if let Ok(kb) = kb.parse::<u64>() {
                    return kb * 1024;
                }
            }
        }
    }
    0
}

async fn count_installed_units(services_root: &std::path::Path) -> Result<u32, AgentError> {
    let mut entries = match tokio::fs::read_dir(services_root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(AgentError::Internal(format!("list services root: {e}"))),
    };
    let mut count = 0u32;
    while let Some(entry) =
        entries.next_entry().await.map_err(|e| AgentError::Internal(format!("list services root: {e}")))?
    {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("kari-") && name.ends_with(".service") {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
