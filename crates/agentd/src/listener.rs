// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket lifecycle and the per-connection accept loop (spec §4.1). Peer
//! credential verification happens here, before a single byte of any
//! request is read — a mismatched UID never reaches `dispatch`.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Arc;

use kari_core::AgentError;
use kari_exec::{Argv, RunAs};
use kari_wire::{read_request, write_response};
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::time::Duration;
use tracing::{error, info, warn};

use crate::dispatch::Dispatcher;

const SOCKET_MODE: u32 = 0o660;
const RPC_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ListenError {
    #[error("bind {0}: {1}")]
    Bind(String, std::io::Error),
    #[error("set socket permissions: {0}")]
    Permissions(std::io::Error),
    #[error("chgrp socket to {0}: {1}")]
    Chgrp(String, AgentError),
}

/// Removes a stale socket file if present, binds fresh, then narrows
/// permissions to `0660` and (if configured) chgrps to the Brain's group.
/// No world access is ever left in place, even transiently.
pub async fn bind(path: &Path, group: Option<&str>) -> Result<UnixListener, ListenError> {
    if path.exists() {
        let _ = std::fs::remove_file(path);
    }
    let listener = UnixListener::bind(path).map_err(|e| ListenError::Bind(path.display().to_string(), e))?;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(SOCKET_MODE))
        .map_err(ListenError::Permissions)?;

    if let Some(group) = group {
        let owner = format!(":{group}");
        kari_exec::run_checked(&Argv::new("chown").arg(&owner).arg(path.to_string_lossy().into_owned()), &RunAs::default())
            .await
            .map_err(|e| ListenError::Chgrp(group.to_string(), e.into()))?;
    }

    Ok(listener)
}

/// Shared context handed to every connection's handler task.
pub struct ListenCtx {
    pub dispatcher: Dispatcher,
    pub expected_brain_uid: u32,
}

/// Accept loop: one task per connection, each independently verifying
/// peer credentials before any RPC is dispatched (spec §8 property 1).
pub async fn run(listener: UnixListener, ctx: Arc<ListenCtx>) {
    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let ctx = Arc::clone(&ctx);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, &ctx).await {
                        warn!(error = %e, "connection handler exited with an error");
                    }
                });
            }
            Err(e) => error!(error = %e, "accept failed"),
        }
    }
}

#[derive(Debug, Error)]
enum ConnectionError {
    #[error("peer credentials unavailable: {0}")]
    PeerCred(std::io::Error),
    #[error(transparent)]
    Protocol(#[from] kari_wire::ProtocolError),
}

async fn handle_connection(stream: tokio::net::UnixStream, ctx: &ListenCtx) -> Result<(), ConnectionError> {
    let peer = stream.peer_cred().map_err(ConnectionError::PeerCred)?;
    if peer.uid() != ctx.expected_brain_uid {
        warn!(
            peer_uid = peer.uid(),
            expected_uid = ctx.expected_brain_uid,
            "rejecting connection: peer UID does not match the configured Brain UID"
        );
        return Ok(());
    }

    let (mut reader, mut writer) = stream.into_split();
    let request = read_request(&mut reader, RPC_TIMEOUT).await?;

    if !request.is_unary() {
        ctx.dispatcher.handle_stream(request, reader, writer).await;
        return Ok(());
    }

    info!(request = ?request, "dispatching request");
    let response = ctx.dispatcher.handle_unary(request).await;
    write_response(&mut writer, &response, RPC_TIMEOUT).await?;
    Ok(())
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
