// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory repositories guarded by `parking_lot::Mutex`, used in tests and
//! by the `AGENT_TRANSPORT=inmemory` development mode. [`InMemoryDeployments::claim_next_pending`]
//! reproduces the single-winner semantics of a Postgres `SELECT ... FOR
//! UPDATE SKIP LOCKED` by holding the mutex across the read-then-write.

use std::collections::HashMap;

use async_trait::async_trait;
use kari_core::{AgentError, Deployment, DeploymentId, DeploymentStatus, Server, Site};
use parking_lot::Mutex;

use crate::repository::{DeploymentRepository, ServerRepository, SiteRepository};

#[derive(Default)]
pub struct InMemorySites(Mutex<HashMap<String, Site>>);

impl InMemorySites {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SiteRepository for InMemorySites {
    async fn insert(&self, site: &Site) -> Result<(), AgentError> {
        self.0.lock().insert(site.id.clone(), site.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Site>, AgentError> {
        Ok(self.0.lock().get(id).cloned())
    }

    async fn mark_active(&self, id: &str) -> Result<(), AgentError> {
        let mut sites = self.0.lock();
        sites
            .get_mut(id)
            .map(|_| ())
            .ok_or_else(|| AgentError::Precondition(format!("no such site: {id}")))
    }
}

#[derive(Default)]
pub struct InMemoryServers(Mutex<HashMap<String, Server>>);

impl InMemoryServers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServerRepository for InMemoryServers {
    async fn insert(&self, server: &Server) -> Result<(), AgentError> {
        self.0.lock().insert(server.id.clone(), server.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Server>, AgentError> {
        Ok(self.0.lock().get(id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryDeployments(Mutex<HashMap<DeploymentId, Deployment>>);

impl InMemoryDeployments {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeploymentRepository for InMemoryDeployments {
    async fn insert(&self, deployment: &Deployment) -> Result<(), AgentError> {
        self.0.lock().insert(deployment.id.clone(), deployment.clone());
        Ok(())
    }

    async fn get(&self, id: &DeploymentId) -> Result<Option<Deployment>, AgentError> {
        Ok(self.0.lock().get(id).cloned())
    }

    async fn claim_next_pending(&self) -> Result<Option<Deployment>, AgentError> {
        let mut deployments = self.0.lock();
        let oldest_pending_id = deployments
            .values()
            .filter(|d| d.status == DeploymentStatus::Pending)
            .min_by_key(|d| d.created_at_ms)
            .map(|d| d.id.clone());

        match oldest_pending_id {
            Some(id) => {
                let deployment = deployments.get_mut(&id).expect("id came from this map");
                deployment
                    .transition(DeploymentStatus::Running)
                    .map_err(|e| AgentError::Internal(e.to_string()))?;
                Ok(Some(deployment.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_status(&self, id: &DeploymentId, status: DeploymentStatus) -> Result<(), AgentError> {
        let mut deployments = self.0.lock();
        let deployment = deployments
            .get_mut(id)
            .ok_or_else(|| AgentError::Precondition(format!("no such deployment: {id}")))?;
        deployment.transition(status).map_err(|e| AgentError::Internal(e.to_string()))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
