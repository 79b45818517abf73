// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Repository interfaces and their Postgres/in-memory implementations
//! (spec §5's deployment-queue claim semantics; spec §3's data model).

mod memory;
mod postgres;
mod repository;
mod schema;

pub use memory::{InMemoryDeployments, InMemoryServers, InMemorySites};
pub use postgres::{PgDeployments, PgServers, PgSites};
pub use repository::{DeploymentRepository, ServerRepository, SiteRepository};
pub use schema::ensure_schema;
