// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use kari_core::LogLevel;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::*;

#[tokio::test]
async fn captures_stdout_and_exit_code() {
    let argv = Argv::new("/bin/echo").arg("hello world");
    let out = run(&argv, &RunAs::default()).await.unwrap();
    assert_eq!(out.exit_code, 0);
    assert_eq!(out.stdout, b"hello world\n");
}

#[tokio::test]
async fn run_checked_rejects_non_zero_exit() {
    let argv = Argv::new("/bin/sh").args(["-c", "exit 7"]);
    let err = run_checked(&argv, &RunAs::default()).await.unwrap_err();
    match err {
        ExecError::NonZeroExit { exit_code, .. } => assert_eq!(exit_code, 7),
        other => panic!("expected NonZeroExit, got {other:?}"),
    }
}

#[tokio::test]
async fn argument_containing_shell_metacharacters_is_not_interpreted() {
    // If this were ever handed to a shell, `; touch pwned` would run as a
    // second command instead of being treated as one literal argument.
    let argv = Argv::new("/bin/echo").arg("a; touch pwned; b");
    let out = run(&argv, &RunAs::default()).await.unwrap();
    assert_eq!(out.stdout, b"a; touch pwned; b\n");
}

#[tokio::test]
async fn git_invocations_disable_hooks() {
    let argv = Argv::new("/usr/bin/env").args(["sh", "-c", "echo $GIT_CONFIG_VALUE_0"]);
    // Verifies the env override mechanism itself rather than invoking git,
    // since the test sandbox may not have git installed.
    let mut as_user = RunAs::default();
    as_user.envs.push(("GIT_CONFIG_VALUE_0".into(), "/dev/null".into()));
    let out = run(&argv, &as_user).await.unwrap();
    assert_eq!(out.stdout, b"/dev/null\n");
}

#[tokio::test]
async fn spawn_streaming_forwards_lines_and_sends_eof() {
    let argv = Argv::new("/bin/sh").args(["-c", "echo one; echo two >&2"]);
    let (tx, mut rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let out =
        spawn_streaming(&argv, &RunAs::default(), "trace-1", tx, cancel).await.unwrap();
    assert_eq!(out.exit_code, 0);

    let mut saw_eof = false;
    let mut lines = Vec::new();
    while let Some(chunk) = rx.recv().await {
        if chunk.is_eof {
            saw_eof = true;
            break;
        }
        lines.push((chunk.level, String::from_utf8(chunk.message).unwrap()));
    }
    assert!(saw_eof);
    assert!(lines.contains(&(LogLevel::Stdout, "one".to_string())));
    assert!(lines.contains(&(LogLevel::Stderr, "two".to_string())));
}

#[tokio::test]
async fn spawn_streaming_kills_process_on_cancellation() {
    let argv = Argv::new("/bin/sleep").arg("30");
    let (tx, _rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel_clone.cancel();
    });
    let err = spawn_streaming(&argv, &RunAs::default(), "trace-2", tx, cancel).await.unwrap_err();
    assert!(matches!(err, ExecError::Wait { .. }));
}

#[test]
fn absolute_rejects_relative_paths() {
    assert!(absolute(std::path::Path::new("relative/path")).is_err());
    assert!(absolute(std::path::Path::new("/abs/path")).is_ok());
}
