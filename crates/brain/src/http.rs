// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Brain's HTTP surface (spec §6): exactly three endpoints, with no
//! routing feature used beyond what those three need.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use kari_adapters::SystemChecker;
use kari_core::{AgentError, Server, Site, SystemCheckReport};
use kari_pipeline::ActivationPipeline;
use kari_storage::{ServerRepository, SiteRepository};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::limit::RequestBodyLimitLayer;

use crate::health::HealthState;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ActivationPipeline>,
    pub sites: Arc<dyn SiteRepository>,
    pub servers: Arc<dyn ServerRepository>,
    pub checker: Arc<SystemChecker>,
    pub health: Arc<HealthState>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/sites/activate", post(activate_site))
        .route("/v1/servers/onboard", post(onboard_server))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ActivateSiteRequest {
    id: String,
    domain: String,
    #[serde(default)]
    ipv4: Option<String>,
    #[serde(default)]
    ipv6: Option<String>,
    owner_uid: i64,
}

async fn activate_site(
    State(state): State<AppState>,
    Json(body): Json<ActivateSiteRequest>,
) -> (StatusCode, Json<Value>) {
    let site = Site::new(body.id, body.domain, body.ipv4, body.ipv6, body.owner_uid);
    if let Err(e) = site.validate() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() })));
    }

    if let Err(e) = state.sites.insert(&site).await {
        tracing::error!(error = %e, site_id = %site.id, "failed to record site before activation");
        return error_response(&e);
    }

    match state.pipeline.activate(&site).await {
        Ok(()) => (StatusCode::ACCEPTED, Json(json!({ "status": "activation_started" }))),
        Err(AgentError::Validation(message)) => (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))),
        Err(e) => {
            tracing::error!(error = %e, site_id = %site.id, "site activation pipeline failed");
            error_response(&e)
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OnboardServerRequest {
    id: String,
    address: String,
}

#[derive(Serialize)]
struct OnboardServerResponse {
    status: &'static str,
    report: SystemCheckReport,
}

async fn onboard_server(
    State(state): State<AppState>,
    Json(body): Json<OnboardServerRequest>,
) -> (StatusCode, Json<Value>) {
    let server = Server::new(body.id, body.address);
    if !server.is_valid() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "id and address must not be blank" })));
    }

    let report = match state.checker.check_eligible(&server.id).await {
        Ok(report) => report,
        Err(e @ (AgentError::Validation(_) | AgentError::Precondition(_))) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e.public_message() })));
        }
        Err(e) => {
            tracing::error!(error = %e, server_id = %server.id, "server onboarding check failed");
            return error_response(&e);
        }
    };

    if let Err(e) = state.servers.insert(&server).await {
        tracing::error!(error = %e, server_id = %server.id, "failed to record onboarded server");
        return error_response(&e);
    }

    let body = OnboardServerResponse { status: "onboarded", report };
    (StatusCode::OK, Json(serde_json::to_value(body).unwrap_or_else(|_| json!({}))))
}

async fn healthz(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.health.is_healthy() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    }
}

fn error_response(e: &AgentError) -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.public_message() })))
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
