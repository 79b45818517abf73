// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idempotent per-application system-user creation (spec §4.3.2). Each
//! application gets a dedicated user with a non-interactive shell and no
//! supplementary groups, so a compromised build process can do nothing
//! outside its own release tree.

use kari_core::AgentError;
use kari_exec::{resolve_user, Argv, LookupError, RunAs};

const JAIL_SHELL: &str = "/bin/false";

/// Create the system user for `username` at exactly `uid`, or confirm one
/// already exists at that uid. A user existing at a *different* uid is a
/// precondition failure (spec §7) rather than something this silently
/// papers over.
pub async fn ensure_system_user(username: &str, uid: i64) -> Result<(), AgentError> {
    match resolve_user(username) {
        Ok((existing_uid, _)) => {
            if i64::from(existing_uid) != uid {
                return Err(AgentError::Precondition(format!(
                    "user {username} exists with uid {existing_uid}, expected {uid}"
                )));
            }
            Ok(())
        }
        Err(LookupError::NoSuchUser(_)) => create_system_user(username, uid).await,
        Err(e) => Err(AgentError::Internal(format!("nss lookup for {username}: {e}"))),
    }
}

async fn create_system_user(username: &str, uid: i64) -> Result<(), AgentError> {
    let argv = Argv::new("useradd")
        .arg("--system")
        .arg("--no-create-home")
        .arg("--no-user-group")
        .arg("--shell")
        .arg(JAIL_SHELL)
        .arg("--uid")
        .arg(uid.to_string())
        .arg(username);

    kari_exec::run_checked(&argv, &RunAs::default()).await.map(|_| ()).map_err(|e| match e {
        kari_exec::ExecError::NonZeroExit { stderr, exit_code, .. } => AgentError::Precondition(
            format!("useradd {username} failed (exit {exit_code}): {}", String::from_utf8_lossy(&stderr)),
        ),
        other => other.into(),
    })
}
