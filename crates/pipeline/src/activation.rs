// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The site-activation pipeline (spec §4.2): an ordered sequence of agent
//! RPCs, a DNS publish, and a certificate issuance, with no implicit
//! rollback on failure — each step is idempotent on re-invocation instead.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use kari_adapters::{Agent, CertificateIssuer, DnsProvider};
use kari_core::{AgentError, Site};
use kari_storage::SiteRepository;
use kari_wire::SiteAction;
use zeroize::Zeroize;

/// A transient failure is retried exactly once after this backoff (spec
/// §7); every other error kind is fatal to the activation attempt.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

pub struct ActivationPipeline {
    agent: Arc<dyn Agent>,
    dns: Arc<dyn DnsProvider>,
    issuer: Arc<dyn CertificateIssuer>,
    sites: Arc<dyn SiteRepository>,
}

impl ActivationPipeline {
    pub fn new(
        agent: Arc<dyn Agent>,
        dns: Arc<dyn DnsProvider>,
        issuer: Arc<dyn CertificateIssuer>,
        sites: Arc<dyn SiteRepository>,
    ) -> Self {
        Self { agent, dns, issuer, sites }
    }

    /// Runs the pipeline end to end for `site`. Validation happens first
    /// and short-circuits before any RPC (spec §8 scenario 2). Any later
    /// step's failure aborts the pipeline without rolling back earlier
    /// side effects; the site is left inactive.
    pub async fn activate(&self, site: &Site) -> Result<(), AgentError> {
        site.validate().map_err(|e| AgentError::Validation(e.to_string()))?;

        self.with_retry(|| {
            self.agent.activate_site(
                &site.id,
                &site.domain,
                site.ipv4.clone(),
                site.ipv6.clone(),
                site.owner_uid,
                SiteAction::CreateSystemUser,
            )
        })
        .await?;

        self.with_retry(|| {
            self.agent.activate_site(
                &site.id,
                &site.domain,
                site.ipv4.clone(),
                site.ipv6.clone(),
                site.owner_uid,
                SiteAction::ApplyHttpVhost,
            )
        })
        .await?;

        self.with_retry(|| {
            self.dns.ensure_address_records(&site.domain, site.ipv4.as_deref(), site.ipv6.as_deref())
        })
        .await?;

        let (fullchain_pem, mut privkey_pem) = self.issuer.issue(&site.domain, &self.agent).await?;
        let install_result = self
            .with_retry(|| self.agent.install_certificate(&site.domain, fullchain_pem.clone(), privkey_pem.clone()))
            .await;
        privkey_pem.zeroize();
        install_result?;

        self.with_retry(|| {
            self.agent.activate_site(
                &site.id,
                &site.domain,
                site.ipv4.clone(),
                site.ipv6.clone(),
                site.owner_uid,
                SiteAction::ApplyHttpsVhost,
            )
        })
        .await?;

        self.sites.mark_active(&site.id).await
    }

    async fn with_retry<Fut>(&self, mut attempt: impl FnMut() -> Fut) -> Result<(), AgentError>
    where
        Fut: Future<Output = Result<(), AgentError>>,
    {
        match attempt().await {
            Err(e) if e.is_retriable() => {
                tracing::warn!(error = %e, "retrying transient activation step after backoff");
                tokio::time::sleep(RETRY_BACKOFF).await;
                attempt().await
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "activation_tests.rs"]
mod tests;
