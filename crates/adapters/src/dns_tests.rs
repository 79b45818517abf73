// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::fake::FakeDnsProvider;
use super::DnsProvider;

#[tokio::test]
async fn records_the_domain_and_both_addresses() {
    let provider = FakeDnsProvider::new();
    provider.ensure_address_records("example.com", Some("203.0.113.5"), Some("2001:db8::5")).await.unwrap();

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].domain, "example.com");
    assert_eq!(calls[0].ipv4.as_deref(), Some("203.0.113.5"));
    assert_eq!(calls[0].ipv6.as_deref(), Some("2001:db8::5"));
}

#[tokio::test]
async fn ipv6_is_optional() {
    let provider = FakeDnsProvider::new();
    provider.ensure_address_records("example.com", Some("203.0.113.5"), None).await.unwrap();
    assert_eq!(provider.calls()[0].ipv6, None);
}

#[tokio::test]
async fn ipv4_is_optional_too() {
    let provider = FakeDnsProvider::new();
    provider.ensure_address_records("example.com", None, None).await.unwrap();
    assert_eq!(provider.calls()[0].ipv4, None);
}
