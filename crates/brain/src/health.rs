// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background health prober (spec §5, §11): polls the agent's system status
//! on a fixed interval so `GET /healthz` has something to answer from
//! without blocking on a live RPC per request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use kari_adapters::Agent;
use parking_lot::Mutex;

const PROBE_INTERVAL: Duration = Duration::from_secs(15);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// A probe counts as recent for twice the poll interval: one missed tick
/// shouldn't flip `/healthz` to unhealthy, two in a row should.
const STALE_AFTER: Duration = Duration::from_secs(PROBE_INTERVAL.as_secs() * 2);

#[derive(Default)]
pub struct HealthState {
    last_success: Mutex<Option<Instant>>,
}

impl HealthState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn is_healthy(&self) -> bool {
        matches!(*self.last_success.lock(), Some(at) if at.elapsed() <= STALE_AFTER)
    }

    fn mark_success(&self) {
        *self.last_success.lock() = Some(Instant::now());
    }
}

/// Spawns the prober loop. Never returns; errors and timeouts are logged
/// and leave the previous `last_success` in place, letting staleness (not an
/// explicit failure flag) drive `/healthz` down after repeated misses.
pub fn spawn(agent: Arc<dyn Agent>, state: Arc<HealthState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PROBE_INTERVAL);
        loop {
            ticker.tick().await;
            match tokio::time::timeout(PROBE_TIMEOUT, agent.get_system_status()).await {
                Ok(Ok(_)) => state.mark_success(),
                Ok(Err(e)) => tracing::warn!(error = %e, "health probe RPC failed"),
                Err(_) => tracing::warn!("health probe timed out after {:?}", PROBE_TIMEOUT),
            }
        }
    });
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
