// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use kari_core::AgentError;
use thiserror::Error;

const STDERR_TAIL_BYTES: usize = 4096;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn {command}: {source}")]
    Spawn { command: String, #[source] source: std::io::Error },

    #[error("failed to wait on {command}: {source}")]
    Wait { command: String, #[source] source: std::io::Error },

    #[error("{command} exited with status {exit_code}")]
    NonZeroExit { command: String, exit_code: i32, stderr: Vec<u8> },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ExecError> for AgentError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::NonZeroExit { exit_code, stderr, .. } => {
                let tail_start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
                AgentError::ExecutionFailed {
                    exit_code,
                    stderr_tail: String::from_utf8_lossy(&stderr[tail_start..]).into_owned(),
                }
            }
            ExecError::Spawn { command, source } => {
                AgentError::Internal(format!("spawn {command} failed: {source}"))
            }
            ExecError::Wait { command, source } => {
                AgentError::Internal(format!("wait on {command} failed: {source}"))
            }
            ExecError::Io(source) => AgentError::Internal(source.to_string()),
        }
    }
}
