// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository traits the Brain depends on. The pipeline and HTTP layer hold
//! `Arc<dyn ...>` of these rather than a concrete Postgres type, so tests run
//! against [`crate::memory`] without a database.

use async_trait::async_trait;
use kari_core::{AgentError, Deployment, DeploymentId, DeploymentStatus, Server, Site};

#[async_trait]
pub trait SiteRepository: Send + Sync {
    async fn insert(&self, site: &Site) -> Result<(), AgentError>;
    async fn get(&self, id: &str) -> Result<Option<Site>, AgentError>;
    async fn mark_active(&self, id: &str) -> Result<(), AgentError>;
}

#[async_trait]
pub trait ServerRepository: Send + Sync {
    async fn insert(&self, server: &Server) -> Result<(), AgentError>;
    async fn get(&self, id: &str) -> Result<Option<Server>, AgentError>;
}

#[async_trait]
pub trait DeploymentRepository: Send + Sync {
    async fn insert(&self, deployment: &Deployment) -> Result<(), AgentError>;
    async fn get(&self, id: &DeploymentId) -> Result<Option<Deployment>, AgentError>;

    /// Atomically select the oldest pending deployment and mark it running.
    /// Exclusive against other callers of this method, even across process
    /// instances for the Postgres-backed implementation (spec §5: "claim
    /// next pending" is a `SELECT ... FOR UPDATE SKIP LOCKED` pattern).
    /// Returns `None` if no deployment is pending.
    async fn claim_next_pending(&self) -> Result<Option<Deployment>, AgentError>;

    async fn set_status(&self, id: &DeploymentId, status: DeploymentStatus) -> Result<(), AgentError>;
}
