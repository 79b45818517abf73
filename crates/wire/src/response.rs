// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unary RPC responses (spec §4.1). Raw OS error text never appears here —
//! only the typed `code` plus a bounded, operator-facing `message`.

use serde::{Deserialize, Serialize};

use kari_core::SystemCheckReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    SystemCheck {
        report: SystemCheckReport,
    },
    ActivationResult {
        ok: bool,
    },
    SystemStatus {
        distro: String,
        cpu_percent: f32,
        rss_bytes: u64,
        active_jail_count: u32,
    },
    /// A classified agent error crossing the wire (spec §7 propagation
    /// policy): a stable `code` plus a bounded human message. The raw OS
    /// error string never leaves the agent process.
    Error {
        code: String,
        message: String,
    },
}

impl Response {
    pub fn from_agent_error(err: &kari_core::AgentError) -> Self {
        Response::Error { code: err.code().to_string(), message: err.public_message() }
    }

    pub fn is_ok(&self) -> bool {
        !matches!(self, Response::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_carries_stable_code_not_raw_os_text() {
        let err = kari_core::AgentError::Internal(
            "open(/var/lib/secret, O_RDONLY): permission denied (os error 13)".into(),
        );
        let resp = Response::from_agent_error(&err);
        match resp {
            Response::Error { code, message } => {
                assert_eq!(code, "internal");
                assert!(message.len() <= 501);
            }
            _ => panic!("expected Error response"),
        }
    }

    #[test]
    fn only_error_variant_is_not_ok() {
        assert!(Response::Ok.is_ok());
        assert!(Response::ActivationResult { ok: true }.is_ok());
        assert!(!Response::Error { code: "internal".into(), message: "x".into() }.is_ok());
    }
}
