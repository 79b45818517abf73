// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Length-prefixed JSON framing shared by unary RPCs and the `LogChunk`
//! stream.

use std::time::Duration;

use kari_core::LogChunk;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Request, Response};

/// Request bodies are capped well below any reasonable build log or
/// certificate chain, but large enough for a `StreamDeployment` payload with
/// an embedded SSH key. Prevents a misbehaving peer from allocating an
/// unbounded buffer from a forged length prefix.
const MAX_FRAME_BYTES: u32 = 8 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed")]
    ConnectionClosed,
    #[error("timed out waiting for peer")]
    Timeout,
    #[error("frame of {0} bytes exceeds the {MAX_FRAME_BYTES} byte limit")]
    FrameTooLarge(u32),
    #[error("malformed JSON payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(ProtocolError::Io(e)),
    }
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_BYTES {
        return Err(ProtocolError::FrameTooLarge(len));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(payload.len()).map_err(|_| ProtocolError::FrameTooLarge(u32::MAX))?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

async fn with_timeout<F, T>(duration: Duration, fut: F) -> Result<T, ProtocolError>
where
    F: std::future::Future<Output = Result<T, ProtocolError>>,
{
    tokio::time::timeout(duration, fut).await.map_err(|_| ProtocolError::Timeout)?
}

pub async fn read_request<R>(reader: &mut R, timeout: Duration) -> Result<Request, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let buf = with_timeout(timeout, read_frame(reader)).await?;
    Ok(serde_json::from_slice(&buf)?)
}

pub async fn write_request<W>(
    writer: &mut W,
    request: &Request,
    timeout: Duration,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_vec(request)?;
    with_timeout(timeout, write_frame(writer, &payload)).await
}

pub async fn read_response<R>(reader: &mut R, timeout: Duration) -> Result<Response, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let buf = with_timeout(timeout, read_frame(reader)).await?;
    Ok(serde_json::from_slice(&buf)?)
}

pub async fn write_response<W>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_vec(response)?;
    with_timeout(timeout, write_frame(writer, &payload)).await
}

/// `StreamDeployment` has no deadline (spec §5); callers pass a long timeout
/// or race against their own cancellation instead.
pub async fn read_log_chunk<R>(reader: &mut R) -> Result<LogChunk, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let buf = read_frame(reader).await?;
    Ok(serde_json::from_slice(&buf)?)
}

pub async fn write_log_chunk<W>(writer: &mut W, chunk: &LogChunk) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_vec(chunk)?;
    write_frame(writer, &payload).await
}

#[cfg(test)]
#[path = "framing_tests.rs"]
mod tests;
