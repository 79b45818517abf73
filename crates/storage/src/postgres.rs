// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Postgres-backed repositories. Queries use `sqlx::query`/`query_as`
//! (runtime-checked) rather than the `query!` macros, so this crate builds
//! without a live database connection or a checked `.sqlx` cache.

use async_trait::async_trait;
use kari_core::{AgentError, Deployment, DeploymentId, DeploymentStatus, Server, Site};
use sqlx::{PgPool, Row};

use crate::repository::{DeploymentRepository, ServerRepository, SiteRepository};

fn db_err(context: &str, err: sqlx::Error) -> AgentError {
    AgentError::Transient(format!("{context}: {err}"))
}

pub struct PgSites(pub PgPool);

#[async_trait]
impl SiteRepository for PgSites {
    async fn insert(&self, site: &Site) -> Result<(), AgentError> {
        sqlx::query(
            "INSERT INTO sites (id, domain, ipv4, ipv6, owner_uid, active) VALUES ($1, $2, $3, $4, $5, false)",
        )
        .bind(&site.id)
        .bind(&site.domain)
        .bind(&site.ipv4)
        .bind(&site.ipv6)
        .bind(site.owner_uid)
        .execute(&self.0)
        .await
        .map_err(|e| db_err("insert site", e))?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Site>, AgentError> {
        let row = sqlx::query("SELECT id, domain, ipv4, ipv6, owner_uid FROM sites WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.0)
            .await
            .map_err(|e| db_err("get site", e))?;
        Ok(row.map(|row| Site {
            id: row.get("id"),
            domain: row.get("domain"),
            ipv4: row.get("ipv4"),
            ipv6: row.get("ipv6"),
            owner_uid: row.get("owner_uid"),
        }))
    }

    async fn mark_active(&self, id: &str) -> Result<(), AgentError> {
        let result = sqlx::query("UPDATE sites SET active = true WHERE id = $1")
            .bind(id)
            .execute(&self.0)
            .await
            .map_err(|e| db_err("mark site active", e))?;
        if result.rows_affected() == 0 {
            return Err(AgentError::Precondition(format!("no such site: {id}")));
        }
        Ok(())
    }
}

pub struct PgServers(pub PgPool);

#[async_trait]
impl ServerRepository for PgServers {
    async fn insert(&self, server: &Server) -> Result<(), AgentError> {
        sqlx::query("INSERT INTO servers (id, address) VALUES ($1, $2)")
            .bind(&server.id)
            .bind(&server.address)
            .execute(&self.0)
            .await
            .map_err(|e| db_err("insert server", e))?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Server>, AgentError> {
        let row = sqlx::query("SELECT id, address FROM servers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.0)
            .await
            .map_err(|e| db_err("get server", e))?;
        Ok(row.map(|row| Server { id: row.get("id"), address: row.get("address") }))
    }
}

pub struct PgDeployments(pub PgPool);

fn status_to_db(status: DeploymentStatus) -> &'static str {
    match status {
        DeploymentStatus::Pending => "pending",
        DeploymentStatus::Running => "running",
        DeploymentStatus::Success => "success",
        DeploymentStatus::Failed => "failed",
    }
}

fn status_from_db(status: &str) -> Result<DeploymentStatus, AgentError> {
    match status {
        "pending" => Ok(DeploymentStatus::Pending),
        "running" => Ok(DeploymentStatus::Running),
        "success" => Ok(DeploymentStatus::Success),
        "failed" => Ok(DeploymentStatus::Failed),
        other => Err(AgentError::Integrity(format!("unknown deployment status in database: {other}"))),
    }
}

fn row_to_deployment(row: sqlx::postgres::PgRow) -> Result<Deployment, AgentError> {
    Ok(Deployment {
        id: row.get("id"),
        site_id: row.get("site_id"),
        status: status_from_db(row.get("status"))?,
        created_at_ms: row.get::<i64, _>("created_at_ms") as u64,
    })
}

#[async_trait]
impl DeploymentRepository for PgDeployments {
    async fn insert(&self, deployment: &Deployment) -> Result<(), AgentError> {
        sqlx::query(
            "INSERT INTO deployments (id, site_id, status, created_at_ms) VALUES ($1, $2, $3, $4)",
        )
        .bind(&deployment.id)
        .bind(&deployment.site_id)
        .bind(status_to_db(deployment.status))
        .bind(deployment.created_at_ms as i64)
        .execute(&self.0)
        .await
        .map_err(|e| db_err("insert deployment", e))?;
        Ok(())
    }

    async fn get(&self, id: &DeploymentId) -> Result<Option<Deployment>, AgentError> {
        let row = sqlx::query("SELECT id, site_id, status, created_at_ms FROM deployments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.0)
            .await
            .map_err(|e| db_err("get deployment", e))?;
        row.map(row_to_deployment).transpose()
    }

    /// `FOR UPDATE SKIP LOCKED` lets multiple agent workers race this query
    /// without ever claiming the same row: a row another transaction has
    /// already locked is simply excluded from this transaction's candidate
    /// set rather than blocking on it.
    async fn claim_next_pending(&self) -> Result<Option<Deployment>, AgentError> {
        let mut tx = self.0.begin().await.map_err(|e| db_err("begin claim transaction", e))?;
        let row = sqlx::query(
            "SELECT id, site_id, status, created_at_ms FROM deployments \
             WHERE status = 'pending' ORDER BY created_at_ms ASC \
             FOR UPDATE SKIP LOCKED LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_err("select next pending deployment", e))?;

        let Some(row) = row else {
            tx.commit().await.map_err(|e| db_err("commit empty claim", e))?;
            return Ok(None);
        };
        let mut deployment = row_to_deployment(row)?;
        deployment
            .transition(DeploymentStatus::Running)
            .map_err(|e| AgentError::Internal(e.to_string()))?;

        sqlx::query("UPDATE deployments SET status = $1 WHERE id = $2")
            .bind(status_to_db(deployment.status))
            .bind(&deployment.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("mark deployment running", e))?;
        tx.commit().await.map_err(|e| db_err("commit claim", e))?;
        Ok(Some(deployment))
    }

    async fn set_status(&self, id: &DeploymentId, status: DeploymentStatus) -> Result<(), AgentError> {
        let current = self
            .get(id)
            .await?
            .ok_or_else(|| AgentError::Precondition(format!("no such deployment: {id}")))?;
        let mut updated = current;
        updated.transition(status).map_err(|e| AgentError::Internal(e.to_string()))?;

        let result = sqlx::query("UPDATE deployments SET status = $1 WHERE id = $2")
            .bind(status_to_db(status))
            .bind(id)
            .execute(&self.0)
            .await
            .map_err(|e| db_err("set deployment status", e))?;
        if result.rows_affected() == 0 {
            return Err(AgentError::Precondition(format!("no such deployment: {id}")));
        }
        Ok(())
    }
}
