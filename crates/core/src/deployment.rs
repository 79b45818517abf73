// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single activation attempt (spec §3).
//!
//! Transitions: pending→running (exclusively, when claimed), running→success,
//! running→failed. No other transitions are legal; success and failed are
//! terminal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type DeploymentId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    Pending,
    Running,
    Success,
    Failed,
}

impl DeploymentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DeploymentStatus::Success | DeploymentStatus::Failed)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("illegal deployment transition from {from:?} to {to:?}")]
pub struct TransitionError {
    pub from: DeploymentStatus,
    pub to: DeploymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: DeploymentId,
    pub site_id: String,
    pub status: DeploymentStatus,
    pub created_at_ms: u64,
}

impl Deployment {
    pub fn new_pending(id: impl Into<String>, site_id: impl Into<String>, created_at_ms: u64) -> Self {
        Self { id: id.into(), site_id: site_id.into(), status: DeploymentStatus::Pending, created_at_ms }
    }

    /// Attempts the transition, enforcing the legal edges of the state
    /// machine. Terminal states never transition again.
    pub fn transition(&mut self, to: DeploymentStatus) -> Result<(), TransitionError> {
        let legal = matches!(
            (self.status, to),
            (DeploymentStatus::Pending, DeploymentStatus::Running)
                | (DeploymentStatus::Running, DeploymentStatus::Success)
                | (DeploymentStatus::Running, DeploymentStatus::Failed)
        );
        if !legal {
            return Err(TransitionError { from: self.status, to });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
#[path = "deployment_tests.rs"]
mod tests;
