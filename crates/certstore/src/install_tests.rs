// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::os::unix::fs::PermissionsExt;

use tempfile::tempdir;

use super::*;

#[tokio::test]
async fn install_writes_both_files_with_the_required_modes() {
    let dir = tempdir().unwrap();
    let locks = DomainLocks::new();
    let mut material =
        CertificateMaterial::new("example.com", b"FULLCHAIN".to_vec(), b"PRIVKEY".to_vec());

    install(dir.path(), &locks, &mut material).await.unwrap();

    let privkey_path = domain_dir(dir.path(), "example.com").join("privkey.pem");
    let fullchain_path = domain_dir(dir.path(), "example.com").join("fullchain.pem");

    let privkey_meta = tokio::fs::metadata(&privkey_path).await.unwrap();
    assert_eq!(privkey_meta.permissions().mode() & 0o777, 0o600);
    assert_eq!(tokio::fs::read(&privkey_path).await.unwrap(), b"PRIVKEY");

    let fullchain_meta = tokio::fs::metadata(&fullchain_path).await.unwrap();
    assert_eq!(fullchain_meta.permissions().mode() & 0o777, 0o644);
    assert_eq!(tokio::fs::read(&fullchain_path).await.unwrap(), b"FULLCHAIN");
}

#[tokio::test]
async fn install_zeroizes_the_in_memory_buffer_even_on_success() {
    let dir = tempdir().unwrap();
    let locks = DomainLocks::new();
    let mut material =
        CertificateMaterial::new("example.com", b"FULLCHAIN".to_vec(), b"PRIVKEY".to_vec());

    install(dir.path(), &locks, &mut material).await.unwrap();
    assert!(material.privkey_pem.is_empty());
}

#[tokio::test]
async fn reinstalling_the_same_domain_overwrites_the_previous_key() {
    let dir = tempdir().unwrap();
    let locks = DomainLocks::new();
    let mut first =
        CertificateMaterial::new("example.com", b"FULLCHAIN1".to_vec(), b"PRIVKEY1".to_vec());
    install(dir.path(), &locks, &mut first).await.unwrap();

    let mut second =
        CertificateMaterial::new("example.com", b"FULLCHAIN2".to_vec(), b"PRIVKEY2".to_vec());
    install(dir.path(), &locks, &mut second).await.unwrap();

    let privkey_path = domain_dir(dir.path(), "example.com").join("privkey.pem");
    assert_eq!(tokio::fs::read(&privkey_path).await.unwrap(), b"PRIVKEY2");
}
