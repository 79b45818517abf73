// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The identity of a host being onboarded (spec §3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    pub address: String,
}

impl Server {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self { id: id.into(), address: address.into() }
    }

    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.address.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_address_is_invalid() {
        assert!(!Server::new("srv-1", "  ").is_valid());
    }

    #[test]
    fn populated_server_is_valid() {
        assert!(Server::new("srv-1", "10.0.0.1").is_valid());
    }
}
