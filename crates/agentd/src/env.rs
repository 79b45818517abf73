// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the agent binary (spec §6).

use std::path::PathBuf;

const DEFAULT_SOCKET_PATH: &str = "/var/run/kari/agent.sock";
const DEFAULT_RELEASES_PER_APP_KEEP: usize = 5;

/// Path of the RPC socket this process binds. Its parent directory must
/// already exist with mode `0750`, owned `root:<brain_group>`.
pub fn socket_path() -> PathBuf {
    std::env::var("AGENT_SOCKET_PATH").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_SOCKET_PATH))
}

/// Group the socket is chgrp'd to after bind, typically the Brain's
/// primary group. No default: an agent that cannot resolve this group
/// refuses to start rather than leaving the socket world-accessible.
pub fn brain_group() -> Option<String> {
    std::env::var("AGENT_SOCKET_GROUP").ok().filter(|s| !s.is_empty())
}

/// The peer UID every accepted connection is checked against (spec §4.1,
/// §8 property 1). Required; there is no safe default.
pub fn expected_brain_uid() -> Option<i64> {
    std::env::var("EXPECTED_BRAIN_UID").ok().and_then(|s| s.parse().ok())
}

pub fn web_root() -> PathBuf {
    std::env::var("WEB_ROOT").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/var/www"))
}

pub fn web_user() -> String {
    std::env::var("WEB_USER").unwrap_or_else(|_| "www-data".to_string())
}

pub fn web_group() -> String {
    std::env::var("WEB_GROUP").unwrap_or_else(|_| "www-data".to_string())
}

pub fn cert_root() -> PathBuf {
    std::env::var("CERT_ROOT").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/etc/kari/certs"))
}

pub fn services_root() -> PathBuf {
    std::env::var("SERVICES_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/etc/systemd/system"))
}

/// Base directory applications are jailed under; not named in §6 but
/// required by every `kari_jail::release` call, which takes an app
/// directory rather than assuming one.
pub fn app_root() -> PathBuf {
    std::env::var("APP_ROOT").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/srv/kari/apps"))
}

pub fn releases_per_app_keep() -> usize {
    std::env::var("RELEASES_PER_APP_KEEP")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_RELEASES_PER_APP_KEEP)
}

/// Service manager binary used to reload the reverse proxy and generated
/// units (spec §4.3.6). Not named in §6; `systemctl` is the only sane
/// default on the hosts this agent targets.
pub fn service_manager() -> String {
    std::env::var("SERVICE_MANAGER").unwrap_or_else(|_| "systemctl".to_string())
}

pub fn proxy_unit_name() -> String {
    std::env::var("PROXY_UNIT_NAME").unwrap_or_else(|_| "nginx".to_string())
}

pub fn proxy_config_root() -> PathBuf {
    std::env::var("PROXY_CONFIG_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/etc/nginx/sites-enabled"))
}

pub fn proxy_syntax_check_program() -> String {
    std::env::var("PROXY_SYNTAX_CHECK_PROGRAM").unwrap_or_else(|_| "nginx".to_string())
}

pub fn proxy_syntax_check_args() -> Vec<String> {
    vec!["-t".to_string(), "-c".to_string(), "{path}".to_string()]
}

/// Firewall CLI queried by `RunSystemCheck`. Not named in §6; `ufw` is the
/// only firewall frontend the pack's systems target by default.
pub fn firewall_program() -> String {
    std::env::var("FIREWALL_PROGRAM").unwrap_or_else(|_| "ufw".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial(agentd_env)]
    fn socket_path_defaults_when_unset() {
        std::env::remove_var("AGENT_SOCKET_PATH");
        assert_eq!(socket_path(), PathBuf::from(DEFAULT_SOCKET_PATH));
    }

    #[test]
    #[serial(agentd_env)]
    fn expected_brain_uid_parses_a_set_value() {
        std::env::set_var("EXPECTED_BRAIN_UID", "1001");
        assert_eq!(expected_brain_uid(), Some(1001));
        std::env::remove_var("EXPECTED_BRAIN_UID");
    }

    #[test]
    #[serial(agentd_env)]
    fn expected_brain_uid_is_none_when_unset() {
        std::env::remove_var("EXPECTED_BRAIN_UID");
        assert_eq!(expected_brain_uid(), None);
    }

    #[test]
    #[serial(agentd_env)]
    fn releases_per_app_keep_falls_back_to_default_on_garbage() {
        std::env::set_var("RELEASES_PER_APP_KEEP", "not-a-number");
        assert_eq!(releases_per_app_keep(), DEFAULT_RELEASES_PER_APP_KEEP);
        std::env::remove_var("RELEASES_PER_APP_KEEP");
    }
}
