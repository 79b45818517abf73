// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolving the unprivileged identity a build or runtime command executes
//! as. The agent itself never `execve`s a user's build command as root
//! (spec §4.3.2) — it resolves the target uid/gid here and hands them to
//! [`crate::run::RunAs`], which applies them to the child via
//! `Command::uid`/`Command::gid` before the child replaces itself.

use nix::unistd::{Group, User};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no such user: {0}")]
    NoSuchUser(String),
    #[error("no such group: {0}")]
    NoSuchGroup(String),
    #[error("nss lookup failed: {0}")]
    Errno(#[from] nix::errno::Errno),
}

/// Resolve a system username to the (uid, gid) pair it should run as.
pub fn resolve_user(name: &str) -> Result<(u32, u32), LookupError> {
    let user = User::from_name(name)?.ok_or_else(|| LookupError::NoSuchUser(name.to_string()))?;
    Ok((user.uid.as_raw(), user.gid.as_raw()))
}

/// Resolve a system group name to its gid, for directories or sockets owned
/// by a group rather than a single user (e.g. the agent socket's group).
pub fn resolve_group(name: &str) -> Result<u32, LookupError> {
    let group = Group::from_name(name)?.ok_or_else(|| LookupError::NoSuchGroup(name.to_string()))?;
    Ok(group.gid.as_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_root_which_always_exists() {
        let (uid, gid) = resolve_user("root").unwrap();
        assert_eq!(uid, 0);
        assert_eq!(gid, 0);
    }

    #[test]
    fn unknown_user_is_reported_by_name() {
        let err = resolve_user("no-such-user-kari-test").unwrap_err();
        assert!(matches!(err, LookupError::NoSuchUser(name) if name == "no-such-user-kari-test"));
    }
}
