// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ACME HTTP-01 challenge material (spec §3, §4.3.5).

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeAction {
    Present,
    Cleanup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeIntent {
    pub action: ChallengeAction,
    pub domain: String,
    pub token: String,
    pub key_authorization: String,
}

impl ChallengeIntent {
    /// Rejects tokens containing `/`, `..`, or any character outside
    /// `[A-Za-z0-9_-]` (spec §4.3.5, §8 boundary behaviour).
    pub fn validate_token(token: &str) -> Result<(), AgentError> {
        if token.is_empty() {
            return Err(AgentError::Validation("challenge token must not be empty".into()));
        }
        if token.contains('/') || token.contains("..") {
            return Err(AgentError::Validation(
                "challenge token must not contain '/' or '..'".into(),
            ));
        }
        if !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(AgentError::Validation(
                "challenge token must match [A-Za-z0-9_-]+".into(),
            ));
        }
        Ok(())
    }

    /// The HTTP-01 well-known path this token resolves to, relative to the
    /// configured web root.
    pub fn relative_path(&self) -> String {
        format!(".well-known/acme-challenge/{}", self.token)
    }
}

#[cfg(test)]
#[path = "challenge_tests.rs"]
mod tests;
