// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell-free process execution (spec §4.3.1). Every command here is spawned
//! directly via `execve` through `tokio::process::Command` — there is no
//! intermediate shell, no word splitting, and no glob expansion.

use std::path::Path;
use std::time::Instant;

use kari_core::{LogChunk, LogLevel};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::argv::Argv;
use crate::error::ExecError;

/// Buffered result of a short-lived command (package-manager calls, `useradd`,
/// `nginx -t`, git plumbing). Commands expected to run for minutes stream
/// through [`spawn_streaming`] instead.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Identity and environment a command runs under. `uid`/`gid` drop privilege
/// before `execve` runs — the agent process itself is never replaced by the
/// child, and the child never inherits root (spec §4.3.2).
#[derive(Debug, Clone, Default)]
pub struct RunAs {
    pub cwd: Option<std::path::PathBuf>,
    pub envs: Vec<(String, String)>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

fn build_command(argv: &Argv, as_user: &RunAs) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(argv.program());
    cmd.args(argv.argv());
    if let Some(cwd) = &as_user.cwd {
        cmd.current_dir(cwd);
    }
    cmd.envs(as_user.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    // git reads hooks from the repository by default; a cloned repo under an
    // untrusted URL must never get to run one. Overriding via env rather than
    // argv keeps this independent of what the caller already put in `argv`.
    if argv.program() == "git" {
        cmd.env("GIT_CONFIG_COUNT", "1");
        cmd.env("GIT_CONFIG_KEY_0", "core.hooksPath");
        cmd.env("GIT_CONFIG_VALUE_0", "/dev/null");
        cmd.env("GIT_TERMINAL_PROMPT", "0");
    }

    if let Some(uid) = as_user.uid {
        cmd.uid(uid);
    }
    if let Some(gid) = as_user.gid {
        cmd.gid(gid);
    }

    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());
    cmd.stdin(std::process::Stdio::null());
    cmd
}

/// Run a command to completion and capture its output. No step here ever
/// hands the command text to a shell.
pub async fn run(argv: &Argv, as_user: &RunAs) -> Result<CommandOutput, ExecError> {
    let start = Instant::now();
    let span = tracing::info_span!(
        "exec.run",
        program = argv.program(),
        args = ?argv.argv(),
        exit_code = tracing::field::Empty,
        duration_ms = tracing::field::Empty,
    );
    let _entered = span.enter();

    let mut command = build_command(argv, as_user);
    let child = command.spawn().map_err(|source| ExecError::Spawn {
        command: argv.program().to_string(),
        source,
    })?;

    let output = child.wait_with_output().await.map_err(|source| ExecError::Wait {
        command: argv.program().to_string(),
        source,
    })?;

    let duration_ms = start.elapsed().as_millis() as u64;
    let exit_code = output.status.code().unwrap_or(-1);
    tracing::Span::current().record("exit_code", exit_code);
    tracing::Span::current().record("duration_ms", duration_ms);

    Ok(CommandOutput { exit_code, stdout: output.stdout, stderr: output.stderr, duration_ms })
}

/// [`run`], but a non-zero exit status becomes `Err` carrying the stderr tail
/// rather than a `CommandOutput` the caller must remember to check.
pub async fn run_checked(argv: &Argv, as_user: &RunAs) -> Result<CommandOutput, ExecError> {
    let output = run(argv, as_user).await?;
    if output.success() {
        Ok(output)
    } else {
        Err(ExecError::NonZeroExit {
            command: argv.program().to_string(),
            exit_code: output.exit_code,
            stderr: output.stderr,
        })
    }
}

/// Spawn a long-lived command (a deployment's build), forwarding its stdout
/// and stderr line-by-line as [`LogChunk`]s. Returns once the process exits
/// or `cancel` fires, whichever comes first; on cancellation the child is
/// killed and an EOF chunk is still sent so subscribers see a closed stream.
pub async fn spawn_streaming(
    argv: &Argv,
    as_user: &RunAs,
    trace_id: &str,
    chunks: mpsc::Sender<LogChunk>,
    cancel: CancellationToken,
) -> Result<CommandOutput, ExecError> {
    let start = Instant::now();
    let mut command = build_command(argv, as_user);
    let mut child = command.spawn().map_err(|source| ExecError::Spawn {
        command: argv.program().to_string(),
        source,
    })?;

    let stdout = child.stdout.take().expect("stdout piped at spawn");
    let stderr = child.stderr.take().expect("stderr piped at spawn");

    let stdout_task = forward_lines(stdout, trace_id.to_string(), LogLevel::Stdout, chunks.clone());
    let stderr_task = forward_lines(stderr, trace_id.to_string(), LogLevel::Stderr, chunks.clone());

    let wait = async {
        tokio::join!(stdout_task, stderr_task);
        child.wait().await
    };

    let status = tokio::select! {
        status = wait => status.map_err(|source| ExecError::Wait {
            command: argv.program().to_string(),
            source,
        })?,
        _ = cancel.cancelled() => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            let _ = chunks.send(LogChunk::eof(trace_id)).await;
            return Err(ExecError::Wait {
                command: argv.program().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Interrupted, "deployment cancelled"),
            });
        }
    };

    let _ = chunks.send(LogChunk::eof(trace_id)).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let exit_code = status.code().unwrap_or(-1);
    Ok(CommandOutput { exit_code, stdout: Vec::new(), stderr: Vec::new(), duration_ms })
}

async fn forward_lines<R>(
    reader: R,
    trace_id: String,
    level: LogLevel,
    chunks: mpsc::Sender<LogChunk>,
) where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if chunks.send(LogChunk::line(&trace_id, level, line.into_bytes())).await.is_err() {
            break;
        }
    }
}

/// Path helper for binaries resolved relative to a jail root rather than
/// `$PATH`, kept here because every caller of [`run`] needs it.
pub fn absolute(path: &Path) -> std::io::Result<std::path::PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is not an absolute path", path.display()),
        ))
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
