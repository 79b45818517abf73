// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use kari_core::ChallengeAction;
use tempfile::tempdir;

use super::*;

fn sample_intent(token: &str) -> ChallengeIntent {
    ChallengeIntent {
        action: ChallengeAction::Present,
        domain: "example.com".into(),
        token: token.into(),
        key_authorization: "token.key-thumbprint".into(),
    }
}

#[tokio::test]
async fn present_writes_key_authorization_under_well_known() {
    let dir = tempdir().unwrap();
    let intent = sample_intent("abc123");
    present(dir.path(), "root", "root", &intent).await.unwrap();

    let path = dir.path().join(".well-known/acme-challenge/abc123");
    assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "token.key-thumbprint");
}

#[tokio::test]
async fn present_rejects_a_path_traversal_token_before_touching_the_filesystem() {
    let dir = tempdir().unwrap();
    let intent = sample_intent("../../etc/passwd");
    let err = present(dir.path(), "root", "root", &intent).await.unwrap_err();
    assert_eq!(err.code(), "validation");
    assert!(!dir.path().join(".well-known").exists());
}

#[tokio::test]
async fn cleanup_removes_only_the_named_token_file() {
    let dir = tempdir().unwrap();
    let kept = sample_intent("keep-me");
    let removed = sample_intent("remove-me");
    present(dir.path(), "root", "root", &kept).await.unwrap();
    present(dir.path(), "root", "root", &removed).await.unwrap();

    cleanup(dir.path(), &removed).await.unwrap();

    assert!(!dir.path().join(".well-known/acme-challenge/remove-me").exists());
    assert!(dir.path().join(".well-known/acme-challenge/keep-me").exists());
}

#[tokio::test]
async fn cleanup_of_an_absent_token_is_not_an_error() {
    let dir = tempdir().unwrap();
    let intent = sample_intent("never-presented");
    cleanup(dir.path(), &intent).await.unwrap();
}

#[tokio::test]
async fn cleanup_rejects_illegal_tokens_without_touching_the_filesystem() {
    let dir = tempdir().unwrap();
    let intent = sample_intent("../escape");
    let err = cleanup(dir.path(), &intent).await.unwrap_err();
    assert_eq!(err.code(), "validation");
}
