// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic derivation of host-facing names from wire identifiers.
//!
//! `ActivateSite` and `StreamDeployment` carry a `site_id`/`app_id` but
//! neither a POSIX username nor an upstream port: both are derived here so
//! that re-invoking the pipeline on the same site always reaches the same
//! user and the same port (spec §8: idempotence on re-invocation).

const USERNAME_PREFIX: &str = "kari-";
const MAX_USERNAME_LEN: usize = 32;
const UPSTREAM_PORT_BASE: u16 = 20_000;
const UPSTREAM_PORT_RANGE: u16 = 40_000;

/// A POSIX-legal username for `site_id`: lowercased, non-alphanumerics
/// folded to `-`, prefixed, and truncated to the platform's 32-byte limit.
pub fn system_username(site_id: &str) -> String {
    let sanitized: String = site_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let mut name = format!("{USERNAME_PREFIX}{sanitized}");
    name.truncate(MAX_USERNAME_LEN);
    name
}

/// A stable upstream port for `site_id`, derived by hashing rather than
/// assigned sequentially — re-deriving it later (retry, restart) never
/// needs a lookup table.
pub fn upstream_port(site_id: &str) -> u16 {
    UPSTREAM_PORT_BASE + (fnv1a(site_id.as_bytes()) % u32::from(UPSTREAM_PORT_RANGE)) as u16
}

fn fnv1a(bytes: &[u8]) -> u32 {
    const OFFSET: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    bytes.iter().fold(OFFSET, |hash, &b| (hash ^ u32::from(b)).wrapping_mul(PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_is_deterministic_and_prefixed() {
        assert_eq!(system_username("site-1"), "kari-site-1");
        assert_eq!(system_username("site-1"), system_username("site-1"));
    }

    #[test]
    fn username_folds_non_alphanumerics_and_truncates() {
        let name = system_username("Site.With Weird/Chars-and-a-very-long-id-indeed");
        assert!(name.len() <= MAX_USERNAME_LEN);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }

    #[test]
    fn upstream_port_is_deterministic_and_in_range() {
        let port = upstream_port("site-1");
        assert_eq!(port, upstream_port("site-1"));
        assert!(port >= UPSTREAM_PORT_BASE);
        assert!(port < UPSTREAM_PORT_BASE + UPSTREAM_PORT_RANGE);
    }

    #[test]
    fn different_ids_usually_derive_different_ports() {
        assert_ne!(upstream_port("site-1"), upstream_port("site-2"));
    }
}
