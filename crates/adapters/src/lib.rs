// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Brain-side collaborators that cross a process or network boundary: the
//! agent RPC client, the DNS provider, and the system-check wrapper built
//! on top of it.

mod acme;
mod agent;
mod dns;
mod system_checker;

pub use acme::{AcmeHttp01Issuer, CertificateIssuer};
pub use agent::{from_env, Agent, LocalSocketAgent, SystemStatus};
pub use dns::{DnsProvider, HttpDnsProvider};
pub use system_checker::SystemChecker;

#[cfg(any(test, feature = "test-support"))]
pub use acme::FakeCertificateIssuer;
#[cfg(any(test, feature = "test-support"))]
pub use agent::{FakeAgent, FakeCall};
#[cfg(any(test, feature = "test-support"))]
pub use dns::{DnsCall, FakeDnsProvider};
