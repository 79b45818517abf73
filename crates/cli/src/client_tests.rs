// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::Json as JsonExtract;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use super::*;

async fn spawn_fake_brain() -> String {
    let router = Router::new()
        .route("/v1/sites/activate", post(|JsonExtract(_body): JsonExtract<Value>| async {
            (StatusCode::ACCEPTED, Json(json!({ "status": "activation_started" })))
        }))
        .route("/v1/servers/onboard", post(|JsonExtract(_body): JsonExtract<Value>| async {
            (StatusCode::OK, Json(json!({ "status": "onboarded", "report": { "distro": "debian" } })))
        }))
        .route("/healthz", get(|| async { (StatusCode::OK, "ok") }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn activate_site_returns_the_started_status() {
    let client = BrainClient::new(spawn_fake_brain().await);
    let request = ActivateSiteRequest {
        id: "site-1".into(),
        domain: "example.com".into(),
        ipv4: None,
        ipv6: None,
        owner_uid: 1000,
    };
    let response = client.activate_site(&request).await.unwrap();
    assert_eq!(response.status, "activation_started");
}

#[tokio::test]
async fn onboard_server_returns_the_report() {
    let client = BrainClient::new(spawn_fake_brain().await);
    let request = OnboardServerRequest { id: "srv-1".into(), address: "10.0.0.1".into() };
    let response = client.onboard_server(&request).await.unwrap();
    assert_eq!(response.status, "onboarded");
    assert_eq!(response.report["distro"], "debian");
}

#[tokio::test]
async fn healthy_reflects_the_healthz_status() {
    let client = BrainClient::new(spawn_fake_brain().await);
    assert!(client.healthy().await.unwrap());
}

#[tokio::test]
async fn an_unreachable_brain_is_reported_distinctly() {
    let client = BrainClient::new("http://127.0.0.1:1");
    let request = ActivateSiteRequest {
        id: "site-1".into(),
        domain: "example.com".into(),
        ipv4: None,
        ipv6: None,
        owner_uid: 1000,
    };
    let err = client.activate_site(&request).await.unwrap_err();
    assert!(matches!(err, CliError::Unreachable { .. }));
    assert_eq!(err.exit_code(), 2);
}
