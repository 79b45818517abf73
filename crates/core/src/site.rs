// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The identity of a to-be-deployed application (spec §3).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A Site is immutable through activation: failure leaves no partial Site
/// recorded as "active".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub domain: String,
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
    pub owner_uid: i64,
}

/// Why a [`Site`] failed validation before any RPC was issued.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SiteValidationError {
    #[error("id must not be blank")]
    BlankId,
    #[error("domain must not be blank")]
    BlankDomain,
    #[error("owner_uid must be positive, got {0}")]
    NonPositiveOwnerUid(i64),
}

impl Site {
    pub fn new(
        id: impl Into<String>,
        domain: impl Into<String>,
        ipv4: Option<String>,
        ipv6: Option<String>,
        owner_uid: i64,
    ) -> Self {
        Self { id: id.into(), domain: domain.into(), ipv4, ipv6, owner_uid }
    }

    /// The pipeline rejects a site with a blank `id`, blank `domain`, or
    /// non-positive `owner_uid` without contacting the agent (spec §4.2).
    pub fn validate(&self) -> Result<(), SiteValidationError> {
        if self.id.trim().is_empty() {
            return Err(SiteValidationError::BlankId);
        }
        if self.domain.trim().is_empty() {
            return Err(SiteValidationError::BlankDomain);
        }
        if self.owner_uid <= 0 {
            return Err(SiteValidationError::NonPositiveOwnerUid(self.owner_uid));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "site_tests.rs"]
mod tests;
