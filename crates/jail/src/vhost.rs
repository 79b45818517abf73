// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reverse-proxy vhost rendering and activation (spec §4.3.6). A generated
//! config is never trusted blind: it is syntax-checked against a staged copy
//! before the atomic rename that makes it live, and the domain is validated
//! before it ever reaches a template so a malicious domain string cannot
//! inject a second directive into the config.

use std::path::{Path, PathBuf};

use kari_core::AgentError;
use kari_exec::Argv;
use regex::Regex;

fn domain_regex() -> Regex {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$")
        .unwrap()
}

pub fn validate_domain(domain: &str) -> Result<(), AgentError> {
    if domain.len() > 253 {
        return Err(AgentError::Validation(format!("domain too long: {domain}")));
    }
    if !domain_regex().is_match(domain) {
        return Err(AgentError::Validation(format!("domain fails validation: {domain}")));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct VhostSpec {
    pub domain: String,
    pub upstream_port: u16,
    pub tls: Option<TlsPaths>,
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub fullchain: PathBuf,
    pub privkey: PathBuf,
}

pub fn render(spec: &VhostSpec) -> Result<String, AgentError> {
    validate_domain(&spec.domain)?;
    let mut cfg = String::new();
    cfg.push_str(&format!("server {{\n    listen 80;\n    server_name {};\n", spec.domain));

    if let Some(tls) = &spec.tls {
        cfg.push_str(&format!(
            "    location /.well-known/acme-challenge/ {{ root {}; }}\n",
            "/var/lib/kari/acme-challenges"
        ));
        cfg.push_str("    location / { return 301 https://$host$request_uri; }\n}\n\n");
        cfg.push_str(&format!("server {{\n    listen 443 ssl;\n    server_name {};\n", spec.domain));
        cfg.push_str(&format!("    ssl_certificate {};\n", tls.fullchain.display()));
        cfg.push_str(&format!("    ssl_certificate_key {};\n", tls.privkey.display()));
    }

    cfg.push_str(&format!(
        "    location / {{\n        proxy_pass http://127.0.0.1:{};\n        proxy_set_header Host $host;\n    }}\n}}\n",
        spec.upstream_port
    ));
    Ok(cfg)
}

pub fn config_path(config_root: &Path, domain: &str) -> PathBuf {
    config_root.join(format!("{domain}.conf"))
}

/// Render, syntax-check, then atomically install. `syntax_check` is the
/// offline config-check program's argv (e.g. `nginx -t -c <path>`), with
/// `{path}` in its args replaced by the staged file's path.
pub async fn apply(
    config_root: &Path,
    spec: &VhostSpec,
    syntax_check_program: &str,
    syntax_check_args: &[String],
) -> Result<(), AgentError> {
    let contents = render(spec)?;
    let staged = config_root.join(format!(".{}.tmp-check", spec.domain));
    tokio::fs::write(&staged, &contents)
        .await
        .map_err(|e| AgentError::Internal(format!("stage vhost config: {e}")))?;

    let args: Vec<String> =
        syntax_check_args.iter().map(|a| a.replace("{path}", &staged.to_string_lossy())).collect();
    let check = kari_exec::run(&Argv::new(syntax_check_program).args(args), &kari_exec::RunAs::default())
        .await
        .map_err(|e| AgentError::Internal(format!("run config syntax check: {e}")))?;
    if !check.success() {
        let _ = tokio::fs::remove_file(&staged).await;
        return Err(AgentError::Integrity(format!(
            "generated config for {} failed syntax check: {}",
            spec.domain,
            String::from_utf8_lossy(&check.stderr)
        )));
    }

    let dest = config_path(config_root, &spec.domain);
    kari_exec::atomic_rename(&staged, &dest)
        .await
        .map_err(|e| AgentError::Internal(format!("install vhost config: {e}")))
}

/// Trigger a reload through the service manager rather than signalling a
/// PID directly (spec §4.3.6).
pub async fn reload(service_manager: &str, unit_name: &str) -> Result<(), AgentError> {
    let argv = Argv::new(service_manager).args(["reload", unit_name]);
    kari_exec::run_checked(&argv, &kari_exec::RunAs::default())
        .await
        .map(|_| ())
        .map_err(|e| AgentError::Internal(format!("reload {unit_name}: {e}")))
}

#[cfg(test)]
#[path = "vhost_tests.rs"]
mod tests;
