// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn has_checks_presence_not_interpretation() {
    let ctx = ActorContext::new(Actor::new("u1"), [Capability::from("applications.deploy")]);
    assert!(ctx.has("applications.deploy"));
    assert!(!ctx.has("applications.delete"));
    assert!(!ctx.has("admin"));
}

#[test]
fn empty_capability_set_grants_nothing() {
    let ctx = ActorContext::new(Actor::new("u1"), []);
    assert!(!ctx.has("applications.deploy"));
}
