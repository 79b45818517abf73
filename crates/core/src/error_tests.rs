// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    validation = { AgentError::Validation("bad".into()), "validation" },
    unauthorized = { AgentError::Unauthorized, "unauthorized" },
    precondition = { AgentError::Precondition("exists".into()), "precondition" },
    exec = { AgentError::ExecutionFailed { exit_code: 1, stderr_tail: "boom".into() }, "execution_failed" },
    integrity = { AgentError::Integrity("bad config".into()), "integrity" },
    transient = { AgentError::Transient("locked".into()), "transient" },
    internal = { AgentError::Internal("bug".into()), "internal" },
)]
fn code_is_stable_and_independent_of_display(err: AgentError, expected: &str) {
    assert_eq!(err.code(), expected);
}

#[test]
fn only_transient_is_retriable() {
    assert!(AgentError::Transient("x".into()).is_retriable());
    assert!(!AgentError::Internal("x".into()).is_retriable());
    assert!(!AgentError::ExecutionFailed { exit_code: 1, stderr_tail: "x".into() }.is_retriable());
}

#[test]
fn public_message_never_exceeds_bound_plus_ellipsis() {
    let long = "x".repeat(10_000);
    let err = AgentError::Internal(long);
    assert!(err.public_message().chars().count() <= 501);
}

#[test]
fn public_message_truncates_on_char_boundary() {
    let s: String = std::iter::repeat('é').take(600).collect();
    let err = AgentError::Validation(s);
    // Must not panic slicing a multi-byte char in half.
    let msg = err.public_message();
    assert!(msg.ends_with('…'));
}
