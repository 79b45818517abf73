// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use kari_adapters::{FakeAgent, FakeCertificateIssuer, FakeDnsProvider, SystemChecker};
use kari_pipeline::ActivationPipeline;
use kari_storage::{InMemoryServers, InMemorySites};
use tokio::net::TcpListener;

use super::*;

struct Harness {
    base_url: String,
    client: reqwest::Client,
}

async fn harness() -> Harness {
    let agent: Arc<dyn kari_adapters::Agent> = Arc::new(FakeAgent::new());
    let dns = Arc::new(FakeDnsProvider::new());
    let issuer = Arc::new(FakeCertificateIssuer::new());
    let sites: Arc<dyn SiteRepository> = Arc::new(InMemorySites::new());
    let servers: Arc<dyn ServerRepository> = Arc::new(InMemoryServers::new());
    let pipeline = Arc::new(ActivationPipeline::new(agent.clone(), dns, issuer, sites.clone()));
    let checker = Arc::new(SystemChecker::new(agent.clone()));
    let health = HealthState::new();

    let router = build_router(AppState { pipeline, sites, servers, checker, health });
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Harness { base_url: format!("http://{addr}"), client: reqwest::Client::new() }
}

#[tokio::test]
async fn activating_a_valid_site_returns_202() {
    let h = harness().await;
    let response = h
        .client
        .post(format!("{}/v1/sites/activate", h.base_url))
        .json(&serde_json::json!({
            "id": "site-1",
            "domain": "example.com",
            "owner_uid": 1000,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 202);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "activation_started");
}

#[tokio::test]
async fn activating_a_blank_domain_returns_400() {
    let h = harness().await;
    let response = h
        .client
        .post(format!("{}/v1/sites/activate", h.base_url))
        .json(&serde_json::json!({
            "id": "site-1",
            "domain": "",
            "owner_uid": 1000,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn an_unknown_field_is_rejected() {
    let h = harness().await;
    let response = h
        .client
        .post(format!("{}/v1/sites/activate", h.base_url))
        .json(&serde_json::json!({
            "id": "site-1",
            "domain": "example.com",
            "owner_uid": 1000,
            "surprise": "field",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn onboarding_a_healthy_server_returns_200_with_report() {
    let h = harness().await;
    let response = h
        .client
        .post(format!("{}/v1/servers/onboard", h.base_url))
        .json(&serde_json::json!({ "id": "srv-1", "address": "10.0.0.1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "onboarded");
    assert!(body["report"].is_object());
}

#[tokio::test]
async fn healthz_is_unavailable_until_a_probe_succeeds() {
    let h = harness().await;
    let response = h.client.get(format!("{}/healthz", h.base_url)).send().await.unwrap();
    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn a_body_over_the_cap_is_rejected() {
    let h = harness().await;
    let oversized_domain = "a".repeat(MAX_BODY_BYTES + 1);
    let response = h
        .client
        .post(format!("{}/v1/sites/activate", h.base_url))
        .json(&serde_json::json!({
            "id": "site-1",
            "domain": oversized_domain,
            "owner_uid": 1000,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 413);
}
