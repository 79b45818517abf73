// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `karid-brain`: the unprivileged orchestration daemon (spec §4). Exposes
//! the three-endpoint HTTP surface (§6), runs the site-activation pipeline,
//! and talks to the agent over whichever transport `AGENT_TRANSPORT` names.

mod env;
mod health;
mod http;

use std::sync::Arc;

use kari_adapters::{AcmeHttp01Issuer, HttpDnsProvider, SystemChecker};
use kari_pipeline::ActivationPipeline;
use kari_storage::{InMemoryServers, InMemorySites, PgServers, PgSites, ServerRepository, SiteRepository};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let agent = match kari_adapters::from_env() {
        Ok(agent) => agent,
        Err(e) => {
            tracing::error!(error = %e, "failed to construct agent transport");
            std::process::exit(1);
        }
    };

    let (Some(dns_api_base), Some(dns_zone_id), Some(dns_api_token)) =
        (env::dns_api_base(), env::dns_zone_id(), env::dns_api_token())
    else {
        tracing::error!("DNS_API_BASE, DNS_ZONE_ID and DNS_API_TOKEN are all required");
        std::process::exit(1);
    };
    let dns = Arc::new(HttpDnsProvider::new(dns_api_base, dns_zone_id, dns_api_token));

    let Some(acme_contact_email) = env::acme_contact_email() else {
        tracing::error!("ACME_CONTACT_EMAIL is required");
        std::process::exit(1);
    };
    let issuer = Arc::new(AcmeHttp01Issuer::new(env::acme_directory_url(), acme_contact_email));

    let (sites, servers): (Arc<dyn SiteRepository>, Arc<dyn ServerRepository>) =
        match build_repositories().await {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize storage backend");
                std::process::exit(1);
            }
        };

    let pipeline = Arc::new(ActivationPipeline::new(agent.clone(), dns, issuer, sites.clone()));
    let checker = Arc::new(SystemChecker::new(agent.clone()));

    let health_state = health::HealthState::new();
    health::spawn(agent, health_state.clone());

    let router = http::build_router(http::AppState {
        pipeline,
        sites,
        servers,
        checker,
        health: health_state,
    });

    let address = env::http_address();
    let bind_address = if let Some(port) = address.strip_prefix(':') {
        format!("0.0.0.0:{port}")
    } else {
        address.clone()
    };
    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, address = %address, "failed to bind HTTP listener");
            std::process::exit(1);
        }
    };

    tracing::info!(address = %address, "brain listening");
    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!(error = %e, "HTTP server exited");
        std::process::exit(1);
    }
}

async fn build_repositories() -> Result<(Arc<dyn SiteRepository>, Arc<dyn ServerRepository>), String> {
    match env::storage_backend().as_str() {
        "memory" => Ok((Arc::new(InMemorySites::new()), Arc::new(InMemoryServers::new()))),
        "postgres" => {
            let database_url = env::database_url().ok_or("DATABASE_URL is required for STORAGE_BACKEND=postgres")?;
            let pool = sqlx::PgPool::connect(&database_url).await.map_err(|e| e.to_string())?;
            kari_storage::ensure_schema(&pool).await.map_err(|e| e.to_string())?;
            Ok((Arc::new(PgSites(pool.clone())), Arc::new(PgServers(pool))))
        }
        other => Err(format!("unknown STORAGE_BACKEND: {other}")),
    }
}
