// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result of a `RunSystemCheck` RPC (spec §3).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemCheckReport {
    pub distro: String,
    pub version: String,
    pub services: HashMap<String, String>,
    pub firewall_type: String,
    pub firewall_status: String,
}

impl SystemCheckReport {
    /// A report is healthy when every reported service is "active" and the
    /// firewall is "active". Used by `SystemChecker` to classify the raw
    /// report into a pass/fail for onboarding.
    pub fn is_healthy(&self) -> bool {
        self.firewall_status == "active" && self.services.values().all(|status| status == "active")
    }
}
