// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema bootstrap. `CREATE TABLE IF NOT EXISTS` rather than a migration
//! framework — the schema is small and stable enough that a single
//! idempotent statement set covers it.

use kari_core::AgentError;
use sqlx::PgPool;

const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS servers (
    id TEXT PRIMARY KEY,
    address TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sites (
    id TEXT PRIMARY KEY,
    domain TEXT NOT NULL,
    ipv4 TEXT,
    ipv6 TEXT,
    owner_uid BIGINT NOT NULL,
    active BOOLEAN NOT NULL DEFAULT false
);

CREATE TABLE IF NOT EXISTS deployments (
    id TEXT PRIMARY KEY,
    site_id TEXT NOT NULL REFERENCES sites(id),
    status TEXT NOT NULL,
    created_at_ms BIGINT NOT NULL
);

CREATE INDEX IF NOT EXISTS deployments_pending_idx
    ON deployments (created_at_ms)
    WHERE status = 'pending';
"#;

pub async fn ensure_schema(pool: &PgPool) -> Result<(), AgentError> {
    sqlx::raw_sql(DDL)
        .execute(pool)
        .await
        .map_err(|e| AgentError::Internal(format!("schema bootstrap: {e}")))?;
    Ok(())
}
