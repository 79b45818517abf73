// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Certificate ingress material (spec §3, §4.3.4) and the secret-buffer
//! wrapper used for the private key everywhere it is held in memory.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret byte buffer that forbids `Debug`/`Display` formatting, forbids
/// `Clone` (copies would escape zeroization), and overwrites its memory on
/// drop. Per the design notes, the agent MUST use this wrapper for private
/// key material; the Brain best-effort zeroizes its own copy before
/// returning from the handler.
#[derive(ZeroizeOnDrop)]
pub struct SecretBytes(Vec<u8>);

impl SecretBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrites the buffer with zero bytes immediately, without waiting
    /// for drop. The buffer is left empty and unavailable for reuse.
    pub fn zeroize_now(&mut self) {
        self.0.zeroize();
        self.0 = Vec::new();
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBytes").field("len", &self.0.len()).finish_non_exhaustive()
    }
}

/// Freshly-issued certificate material bound for `InstallCertificate`.
#[derive(Debug)]
pub struct CertificateMaterial {
    pub domain: String,
    pub fullchain_pem: Vec<u8>,
    pub privkey_pem: SecretBytes,
}

impl CertificateMaterial {
    pub fn new(domain: impl Into<String>, fullchain_pem: Vec<u8>, privkey_pem: Vec<u8>) -> Self {
        Self { domain: domain.into(), fullchain_pem, privkey_pem: SecretBytes::new(privkey_pem) }
    }
}

#[cfg(test)]
#[path = "certificate_tests.rs"]
mod tests;
