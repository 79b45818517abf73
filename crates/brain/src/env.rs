// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the Brain binary (spec §6).

const DEFAULT_HTTP_ADDRESS: &str = ":8080";
const DEFAULT_ACME_DIRECTORY_URL: &str = "https://acme-v02.api.letsencrypt.org/directory";

pub fn http_address() -> String {
    std::env::var("HTTP_ADDRESS").unwrap_or_else(|_| DEFAULT_HTTP_ADDRESS.to_string())
}

/// Repository backend selector. Not named in §6's environment table, which
/// only describes the agent-facing options; a Brain that persists sites and
/// servers still needs to choose between Postgres and the in-memory
/// repositories used in tests and local development.
pub fn storage_backend() -> String {
    std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "postgres".to_string())
}

pub fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty())
}

/// Cloudflare-shaped DNS API base URL consumed by `HttpDnsProvider`.
pub fn dns_api_base() -> Option<String> {
    std::env::var("DNS_API_BASE").ok().filter(|s| !s.is_empty())
}

pub fn dns_zone_id() -> Option<String> {
    std::env::var("DNS_ZONE_ID").ok().filter(|s| !s.is_empty())
}

pub fn dns_api_token() -> Option<String> {
    std::env::var("DNS_API_TOKEN").ok().filter(|s| !s.is_empty())
}

pub fn acme_directory_url() -> String {
    std::env::var("ACME_DIRECTORY_URL").unwrap_or_else(|_| DEFAULT_ACME_DIRECTORY_URL.to_string())
}

pub fn acme_contact_email() -> Option<String> {
    std::env::var("ACME_CONTACT_EMAIL").ok().filter(|s| !s.is_empty())
}
