// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The request set (spec §4.1). Field order within each variant is
//! authoritative for callers constructing requests by hand.

use serde::{Deserialize, Serialize};

/// The three site-activation RPC actions that flow through `ActivateSite`
/// (spec §4.2 steps 1, 2, 5 — `IssueCertificate` is driven by the ACME
/// challenge/install RPCs below rather than a fourth `SiteAction`). (spec §4.2). `ActivateSite`
/// carries exactly one of these per RPC; the pipeline issues them in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteAction {
    CreateSystemUser,
    ApplyHttpVhost,
    ApplyHttpsVhost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    RunSystemCheck {
        server_id: String,
    },
    ActivateSite {
        site_id: String,
        domain: String,
        ipv4: Option<String>,
        ipv6: Option<String>,
        owner_uid: i64,
        action: SiteAction,
    },
    PresentChallenge {
        domain: String,
        token: String,
        key_auth: String,
    },
    CleanupChallenge {
        domain: String,
        token: String,
    },
    InstallCertificate {
        domain: String,
        fullchain_pem: Vec<u8>,
        privkey_pem: Vec<u8>,
    },
    StreamDeployment {
        trace_id: String,
        app_id: String,
        repo_url: String,
        branch: String,
        build_command: Vec<String>,
        port: u16,
        ssh_key: Option<String>,
    },
    GetSystemStatus,
}

impl Request {
    /// `true` for requests the agent answers with a single `Response`,
    /// `false` for `StreamDeployment`, which upgrades the connection into a
    /// `LogChunk` stream instead.
    pub fn is_unary(&self) -> bool {
        !matches!(self, Request::StreamDeployment { .. })
    }
}
