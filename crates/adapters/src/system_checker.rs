// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wraps the raw `RunSystemCheck`/`GetSystemStatus` RPCs into the pass/fail
//! judgment server onboarding needs (spec §4.2 step 0, §6
//! `POST /v1/servers/onboard`).

use std::sync::Arc;

use kari_core::{AgentError, SystemCheckReport};

use crate::agent::Agent;

pub struct SystemChecker {
    agent: Arc<dyn Agent>,
}

impl SystemChecker {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self { agent }
    }

    /// Runs the check and returns an error when the server isn't eligible
    /// for onboarding, rather than handing the caller a healthy-or-not
    /// report to interpret itself.
    pub async fn check_eligible(&self, server_id: &str) -> Result<SystemCheckReport, AgentError> {
        let report = self.agent.run_system_check(server_id).await?;
        if !report.is_healthy() {
            return Err(AgentError::Precondition(format!(
                "server {server_id} failed onboarding checks: firewall={}, services={:?}",
                report.firewall_status, report.services
            )));
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "system_checker_tests.rs"]
mod tests;
