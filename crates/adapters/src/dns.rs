// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `EnsureAddressRecords`, step 3 of site activation (spec §4.2): point a
//! domain's A/AAAA records at the target server before a certificate is
//! requested, since ACME HTTP-01 validation needs the record resolving
//! first.

use async_trait::async_trait;
use kari_core::AgentError;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Upserts the A record (when `ipv4` is set) and the AAAA record (when
    /// `ipv6` is set) for `domain`. Called unconditionally as step 3 of
    /// site activation, even when neither address is recorded yet, so a
    /// site with no address on file still gets a DNS ensure in the RPC
    /// order. Idempotent: calling this twice with the same arguments
    /// leaves DNS in the same state.
    async fn ensure_address_records(
        &self,
        domain: &str,
        ipv4: Option<&str>,
        ipv6: Option<&str>,
    ) -> Result<(), AgentError>;
}

#[derive(Serialize)]
struct UpsertRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

/// Talks to a Cloudflare-shaped DNS API: `PUT /zones/{zone}/dns_records`
/// with an upsert-by-name-and-type semantic, authenticated with a bearer
/// API token. Any provider exposing the same REST shape works unmodified.
pub struct HttpDnsProvider {
    client: Client,
    api_base: String,
    zone_id: String,
    api_token: String,
}

impl HttpDnsProvider {
    pub fn new(api_base: impl Into<String>, zone_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("kari-brain")
            .build()
            .expect("reqwest client with static TLS config should always build");
        Self { client, api_base: api_base.into(), zone_id: zone_id.into(), api_token: api_token.into() }
    }

    async fn upsert(&self, record_type: &str, domain: &str, content: &str) -> Result<(), AgentError> {
        let url = format!("{}/zones/{}/dns_records", self.api_base.trim_end_matches('/'), self.zone_id);
        let body = UpsertRecord { record_type, name: domain, content, ttl: 300, proxied: false };
        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Transient(format!("dns provider request failed: {e}")))?;

        if response.status().is_success() {
            return Ok(());
        }
        if response.status().is_server_error() || response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AgentError::Transient(format!("dns provider returned {}", response.status())));
        }
        Err(AgentError::Integrity(format!("dns provider rejected {record_type} record for {domain}: {}", response.status())))
    }
}

#[async_trait]
impl DnsProvider for HttpDnsProvider {
    async fn ensure_address_records(
        &self,
        domain: &str,
        ipv4: Option<&str>,
        ipv6: Option<&str>,
    ) -> Result<(), AgentError> {
        if let Some(ipv4) = ipv4 {
            self.upsert("A", domain, ipv4).await?;
        }
        if let Some(ipv6) = ipv6 {
            self.upsert("AAAA", domain, ipv6).await?;
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use std::sync::Arc;

    use async_trait::async_trait;
    use kari_core::AgentError;
    use parking_lot::Mutex;

    use super::DnsProvider;

    #[derive(Debug, Clone, PartialEq)]
    pub struct DnsCall {
        pub domain: String,
        pub ipv4: Option<String>,
        pub ipv6: Option<String>,
    }

    #[derive(Clone, Default)]
    pub struct FakeDnsProvider {
        calls: Arc<Mutex<Vec<DnsCall>>>,
    }

    impl FakeDnsProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<DnsCall> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl DnsProvider for FakeDnsProvider {
        async fn ensure_address_records(
            &self,
            domain: &str,
            ipv4: Option<&str>,
            ipv6: Option<&str>,
        ) -> Result<(), AgentError> {
            self.calls.lock().push(DnsCall {
                domain: domain.to_string(),
                ipv4: ipv4.map(str::to_string),
                ipv6: ipv6.map(str::to_string),
            });
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{DnsCall, FakeDnsProvider};

#[cfg(test)]
#[path = "dns_tests.rs"]
mod tests;
