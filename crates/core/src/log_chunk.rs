// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One unit of build output streamed from the agent (spec §3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Stdout,
    Stderr,
    System,
}

/// Message bytes may contain ANSI escapes; the hub never parses or rewrites
/// them (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogChunk {
    pub trace_id: String,
    pub level: LogLevel,
    pub message: Vec<u8>,
    pub is_eof: bool,
}

impl LogChunk {
    pub fn line(trace_id: impl Into<String>, level: LogLevel, message: impl Into<Vec<u8>>) -> Self {
        Self { trace_id: trace_id.into(), level, message: message.into(), is_eof: false }
    }

    pub fn eof(trace_id: impl Into<String>) -> Self {
        Self { trace_id: trace_id.into(), level: LogLevel::System, message: Vec::new(), is_eof: true }
    }
}
