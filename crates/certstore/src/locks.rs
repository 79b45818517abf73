// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-domain serialization for certificate writes (spec §5: "concurrent
//! writes to the same domain's certificate files are serialized by
//! acquiring a per-domain mutex; the mutex is released before any
//! child-process wait"). Certificate install has no child-process wait, but
//! the lock is still scoped as tightly as the filesystem operations it
//! guards rather than held across the whole RPC handler.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct DomainLocks(Arc<parking_lot::Mutex<HashMap<String, Arc<Mutex<()>>>>>);

impl DomainLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, domain: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut map = self.0.lock();
            map.entry(domain.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
        };
        mutex.lock_owned().await
    }
}
