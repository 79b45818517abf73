// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy propagated across the Brain/agent boundary.
//!
//! Every fallible operation in the core classifies its failure into one of
//! these kinds. The classification is queryable via [`AgentError::code`]
//! without matching on the `Display` string, so callers (HTTP handlers, the
//! wire codec, alerting) can branch on the stable code rather than on
//! formatted text.

use thiserror::Error;

/// Stable, wire-safe classification code. Never changes meaning once shipped.
pub type ErrorCode = &'static str;

/// The only error kinds the core propagates (spec §7).
#[derive(Debug, Error)]
pub enum AgentError {
    /// Input failed a precondition: blank field, bad UID, malformed domain,
    /// illegal challenge token character.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The connection's peer UID did not match the configured expectation.
    #[error("unauthorized peer")]
    Unauthorized,

    /// Host state does not permit the intent (user exists with a different
    /// UID, the port is already bound, etc).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// A spawned child process returned a non-zero exit status.
    #[error("command exited with status {exit_code}: {stderr_tail}")]
    ExecutionFailed { exit_code: i32, stderr_tail: String },

    /// An atomic validation step (config syntax check, certificate parse)
    /// rejected the generated artifact.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// A retriable condition: lock contention, transient filesystem error.
    #[error("transient error: {0}")]
    Transient(String),

    /// Everything else. Treated as a bug; logged with full detail.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Stable classification code, independent of the `Display` message.
    pub fn code(&self) -> ErrorCode {
        match self {
            AgentError::Validation(_) => "validation",
            AgentError::Unauthorized => "unauthorized",
            AgentError::Precondition(_) => "precondition",
            AgentError::ExecutionFailed { .. } => "execution_failed",
            AgentError::Integrity(_) => "integrity",
            AgentError::Transient(_) => "transient",
            AgentError::Internal(_) => "internal",
        }
    }

    /// A bounded, operator-facing message safe to cross the wire or surface
    /// in the HTTP response. Never includes raw OS error text.
    pub fn public_message(&self) -> String {
        match self {
            AgentError::ExecutionFailed { exit_code, stderr_tail } => {
                format!("command failed (exit {exit_code}): {}", bound(stderr_tail, 500))
            }
            other => bound(&other.to_string(), 500),
        }
    }

    /// Whether the pipeline may retry this error once with backoff (§7).
    pub fn is_retriable(&self) -> bool {
        matches!(self, AgentError::Transient(_))
    }
}

fn bound(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let cut = s.char_indices().map(|(i, _)| i).take_while(|&i| i <= max).last().unwrap_or(0);
    format!("{}…", &s[..cut])
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
