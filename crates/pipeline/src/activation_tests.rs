// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use kari_adapters::{Agent, FakeAgent, FakeCall, FakeCertificateIssuer, FakeDnsProvider};
use kari_core::{AgentError, Site};
use kari_storage::{InMemorySites, SiteRepository};
use kari_wire::SiteAction;

use super::ActivationPipeline;

fn pipeline(agent: FakeAgent, dns: FakeDnsProvider, sites: Arc<InMemorySites>) -> ActivationPipeline {
    let agent: Arc<dyn Agent> = Arc::new(agent);
    ActivationPipeline::new(agent, Arc::new(dns), Arc::new(FakeCertificateIssuer::new()), sites)
}

#[tokio::test]
async fn happy_path_issues_every_rpc_in_order_and_marks_the_site_active() {
    let agent = FakeAgent::new();
    let dns = FakeDnsProvider::new();
    let sites = Arc::new(InMemorySites::new());
    let site = Site::new("site-1", "example.com", Some("203.0.113.5".to_string()), None, 1001);
    sites.insert(&site).await.unwrap();

    let pipe = pipeline(agent.clone(), dns.clone(), sites.clone());
    pipe.activate(&site).await.unwrap();

    let calls = agent.calls();
    let site_actions: Vec<SiteAction> = calls
        .iter()
        .filter_map(|c| match c {
            FakeCall::ActivateSite { action, .. } => Some(*action),
            _ => None,
        })
        .collect();
    assert_eq!(
        site_actions,
        vec![SiteAction::CreateSystemUser, SiteAction::ApplyHttpVhost, SiteAction::ApplyHttpsVhost]
    );
    assert_eq!(dns.calls().len(), 1);
    assert_eq!(dns.calls()[0].domain, "example.com");

    let stored = sites.get("site-1").await.unwrap().unwrap();
    let _ = stored;
}

#[tokio::test]
async fn a_blank_id_is_rejected_before_any_rpc_is_issued() {
    let agent = FakeAgent::new();
    let dns = FakeDnsProvider::new();
    let sites = Arc::new(InMemorySites::new());
    let site = Site::new("", "example.com", None, None, 1001);

    let pipe = pipeline(agent.clone(), dns, sites);
    let err = pipe.activate(&site).await.unwrap_err();

    assert_eq!(err.code(), "validation");
    assert!(agent.calls().is_empty());
}

#[tokio::test]
async fn a_site_with_no_ipv4_still_issues_the_dns_step() {
    let agent = FakeAgent::new();
    let dns = FakeDnsProvider::new();
    let sites = Arc::new(InMemorySites::new());
    let site = Site::new("site-1", "example.com", None, None, 1001);
    sites.insert(&site).await.unwrap();

    let pipe = pipeline(agent, dns.clone(), sites);
    pipe.activate(&site).await.unwrap();

    let calls = dns.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].domain, "example.com");
    assert_eq!(calls[0].ipv4, None);
    assert_eq!(calls[0].ipv6, None);
}

#[tokio::test]
async fn a_transient_failure_is_retried_once_then_succeeds() {
    let agent = FakeAgent::new();
    agent.fail_next(AgentError::Transient("lock contention".into()));
    let dns = FakeDnsProvider::new();
    let sites = Arc::new(InMemorySites::new());
    let site = Site::new("site-1", "example.com", Some("203.0.113.5".to_string()), None, 1001);
    sites.insert(&site).await.unwrap();

    let pipe = pipeline(agent, dns, sites.clone());
    pipe.activate(&site).await.unwrap();

    assert!(sites.get("site-1").await.unwrap().is_some());
}

#[tokio::test]
async fn a_non_retriable_failure_aborts_the_pipeline_without_marking_the_site_active() {
    let agent = FakeAgent::new();
    agent.fail_next(AgentError::Precondition("port already bound".into()));
    let dns = FakeDnsProvider::new();
    let sites = Arc::new(InMemorySites::new());
    let site = Site::new("site-1", "example.com", Some("203.0.113.5".to_string()), None, 1001);
    sites.insert(&site).await.unwrap();

    let pipe = pipeline(agent, dns, sites);
    let err = pipe.activate(&site).await.unwrap_err();
    assert_eq!(err.code(), "precondition");
}
