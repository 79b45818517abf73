// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The live log fan-out hub (spec §4.4): broadcasts `LogChunk`s from one
//! upstream `StreamDeployment` RPC to any number of subscribers, with
//! per-subscriber backpressure and ghost-stream cancellation.

use std::collections::HashMap;
use std::sync::Arc;

use kari_core::{DeploymentId, LogChunk};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Chunks beyond this many in flight to one subscriber are dropped, not
/// queued; the upstream build is never slowed by a slow browser.
const SUBSCRIBER_CAPACITY: usize = 100;

pub type SubscriberId = u64;

struct Subscription {
    subscribers: HashMap<SubscriberId, mpsc::Sender<LogChunk>>,
    next_id: SubscriberId,
    cancel: CancellationToken,
}

#[derive(Clone)]
pub struct LogHub {
    deployments: Arc<Mutex<HashMap<DeploymentId, Subscription>>>,
}

impl Default for LogHub {
    fn default() -> Self {
        Self::new()
    }
}

impl LogHub {
    pub fn new() -> Self {
        Self { deployments: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Registers a deployment's cancel handle so the hub can tear down the
    /// upstream stream once every subscriber has left. Called once, right
    /// after `StreamDeployment` is issued.
    pub fn register(&self, deployment_id: DeploymentId, cancel: CancellationToken) {
        self.deployments
            .lock()
            .insert(deployment_id, Subscription { subscribers: HashMap::new(), next_id: 0, cancel });
    }

    /// Drains `source` into the hub on a background task until it closes or
    /// an `is_eof` chunk arrives, whichever comes first.
    pub fn spawn_relay(&self, deployment_id: DeploymentId, mut source: mpsc::Receiver<LogChunk>) {
        let hub = self.clone();
        tokio::spawn(async move {
            while let Some(chunk) = source.recv().await {
                let is_eof = chunk.is_eof;
                hub.broadcast(&deployment_id, chunk);
                if is_eof {
                    break;
                }
            }
        });
    }

    /// Returns `None` if the deployment has no registered upstream (already
    /// finished, or never started).
    pub fn subscribe(&self, deployment_id: &DeploymentId) -> Option<(SubscriberId, mpsc::Receiver<LogChunk>)> {
        let mut deployments = self.deployments.lock();
        let subscription = deployments.get_mut(deployment_id)?;
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        let id = subscription.next_id;
        subscription.next_id += 1;
        subscription.subscribers.insert(id, tx);
        Some((id, rx))
    }

    /// Removing the last subscriber cancels the upstream RPC (the
    /// ghost-stream mitigation) and drops the deployment's bookkeeping.
    pub fn unsubscribe(&self, deployment_id: &DeploymentId, id: SubscriberId) {
        let mut deployments = self.deployments.lock();
        let Some(subscription) = deployments.get_mut(deployment_id) else { return };
        subscription.subscribers.remove(&id);
        if subscription.subscribers.is_empty() {
            subscription.cancel.cancel();
            deployments.remove(deployment_id);
        }
    }

    /// Non-blocking by construction: a full subscriber channel loses this
    /// chunk and nothing else. An `is_eof` chunk is delivered and then the
    /// deployment's subscriber set is torn down, closing every channel.
    pub fn broadcast(&self, deployment_id: &DeploymentId, chunk: LogChunk) {
        let mut deployments = self.deployments.lock();
        let Some(subscription) = deployments.get_mut(deployment_id) else { return };
        let is_eof = chunk.is_eof;
        subscription.subscribers.retain(|_, tx| match tx.try_send(chunk.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
        if is_eof {
            deployments.remove(deployment_id);
        }
    }
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
