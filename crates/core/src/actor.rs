// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An already-authenticated caller identity plus its granted capabilities.
//!
//! The core never interprets capabilities into roles — it only checks
//! presence. RBAC evaluation, session tokens, and cookie parsing live
//! entirely outside this crate.

use std::collections::HashSet;

/// Opaque actor identifier, assigned by the external authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Actor {
    pub id: String,
}

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A single granted capability, e.g. `"applications.deploy"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Capability(pub String);

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl From<&str> for Capability {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The caller as seen by the core: already authenticated, carrying only
/// an identity and a capability set.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub actor: Actor,
    capabilities: HashSet<Capability>,
}

impl ActorContext {
    pub fn new(actor: Actor, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self { actor, capabilities: capabilities.into_iter().collect() }
    }

    /// Whether the actor was granted `capability`. No interpretation of
    /// capability names into roles happens here.
    pub fn has(&self, capability: &str) -> bool {
        self.capabilities.contains(&Capability(capability.to_string()))
    }
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;
