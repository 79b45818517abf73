// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for the CLI, carrying the process exit code `main` uses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("could not reach the brain at {url}: {source}")]
    Unreachable { url: String, source: reqwest::Error },

    #[error("request rejected: {status} {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected response from the brain: {0}")]
    BadResponse(#[from] reqwest::Error),
}

impl CliError {
    /// Process exit code `main` surfaces for this failure. Unreachable is a
    /// distinct code from a rejected request so scripts can tell "the brain
    /// is down" apart from "the brain said no".
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Unreachable { .. } => 2,
            CliError::Rejected { .. } => 1,
            CliError::BadResponse(_) => 1,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
