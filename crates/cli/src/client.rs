// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin HTTP client over the brain's three-endpoint surface (spec §6).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CliError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct BrainClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
pub struct ActivateSiteRequest {
    pub id: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
    pub owner_uid: i64,
}

#[derive(Serialize)]
pub struct OnboardServerRequest {
    pub id: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct ActivateSiteResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct OnboardServerResponse {
    pub status: String,
    pub report: Value,
}

impl BrainClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, base_url: base_url.into() }
    }

    pub async fn activate_site(&self, request: &ActivateSiteRequest) -> Result<ActivateSiteResponse, CliError> {
        self.post("/v1/sites/activate", request).await
    }

    pub async fn onboard_server(&self, request: &OnboardServerRequest) -> Result<OnboardServerResponse, CliError> {
        self.post("/v1/servers/onboard", request).await
    }

    /// Returns `true` if `/healthz` reports the brain healthy.
    pub async fn healthy(&self) -> Result<bool, CliError> {
        let url = format!("{}/healthz", self.base_url);
        let response = self.http.get(&url).send().await.map_err(|source| CliError::Unreachable { url, source })?;
        Ok(response.status().is_success())
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(&self, path: &str, body: &B) -> Result<R, CliError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| CliError::Unreachable { url, source })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<R>().await?);
        }
        let body = response.text().await.unwrap_or_default();
        Err(CliError::Rejected { status: status.as_u16(), body })
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
