// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use kari_adapters::FakeAgent;
use kari_core::AgentError;

use super::*;

#[test]
fn fresh_state_is_unhealthy() {
    let state = HealthState::new();
    assert!(!state.is_healthy());
}

#[tokio::test]
async fn a_successful_probe_marks_the_state_healthy() {
    let state = HealthState::new();
    let agent: Arc<dyn Agent> = Arc::new(FakeAgent::new());
    assert!(agent.get_system_status().await.is_ok());
    state.mark_success();
    assert!(state.is_healthy());
}

#[tokio::test]
async fn a_failing_probe_never_marks_the_state_healthy() {
    let fake = FakeAgent::new();
    fake.fail_next(AgentError::Transient("agent unreachable".into()));
    let agent: Arc<dyn Agent> = Arc::new(fake);
    assert!(agent.get_system_status().await.is_err());

    let state = HealthState::new();
    assert!(!state.is_healthy());
}
