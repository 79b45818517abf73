// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The agent's only path to the host's process table and filesystem (spec
//! §4.3). Every command is an explicit argv vector handed straight to
//! `execve` — there is no shell anywhere in this crate, so there is nothing
//! for an attacker-controlled string to be interpreted by.

mod argv;
mod atomic;
mod error;
mod privdrop;
mod run;

pub use argv::Argv;
pub use atomic::{atomic_rename, create_dir_with_mode, create_with_mode, write_atomic};
pub use error::ExecError;
pub use privdrop::{resolve_group, resolve_user, LookupError};
pub use run::{absolute, run, run_checked, spawn_streaming, CommandOutput, RunAs};
