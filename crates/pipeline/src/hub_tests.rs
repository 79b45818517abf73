// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use kari_core::{LogChunk, LogLevel};
use tokio_util::sync::CancellationToken;

use super::LogHub;

/// Mirrors the private `SUBSCRIBER_CAPACITY` in `hub.rs`.
const SUBSCRIBER_CAPACITY: usize = 100;

fn line(trace_id: &str, n: u32) -> LogChunk {
    LogChunk::line(trace_id, LogLevel::Stdout, format!("line {n}").into_bytes())
}

#[test]
fn subscribing_to_an_unregistered_deployment_returns_none() {
    let hub = LogHub::new();
    assert!(hub.subscribe(&"dep-1".to_string()).is_none());
}

#[tokio::test]
async fn a_subscriber_receives_chunks_in_the_order_they_were_broadcast() {
    let hub = LogHub::new();
    let deployment_id = "dep-1".to_string();
    hub.register(deployment_id.clone(), CancellationToken::new());
    let (_id, mut rx) = hub.subscribe(&deployment_id).unwrap();

    for n in 0..10 {
        hub.broadcast(&deployment_id, line("dep-1", n));
    }

    for n in 0..10 {
        let chunk = rx.recv().await.unwrap();
        assert_eq!(chunk.message, format!("line {n}").into_bytes());
    }
}

#[tokio::test]
async fn a_slow_subscriber_drops_chunks_without_blocking_a_fast_one() {
    let hub = LogHub::new();
    let deployment_id = "dep-1".to_string();
    hub.register(deployment_id.clone(), CancellationToken::new());
    let (_fast_id, mut fast_rx) = hub.subscribe(&deployment_id).unwrap();
    let (_slow_id, mut slow_rx) = hub.subscribe(&deployment_id).unwrap();

    for n in 0..250 {
        hub.broadcast(&deployment_id, line("dep-1", n));
    }

    let mut fast_seen = Vec::new();
    while let Ok(chunk) = fast_rx.try_recv() {
        fast_seen.push(chunk);
    }
    assert_eq!(fast_seen.len(), 250, "a draining subscriber must see every chunk");

    let mut slow_seen = Vec::new();
    while let Ok(chunk) = slow_rx.try_recv() {
        slow_seen.push(chunk);
    }
    assert!(
        slow_seen.len() <= SUBSCRIBER_CAPACITY,
        "a subscriber that never drains must lose chunks beyond its buffer capacity, got {}",
        slow_seen.len()
    );
}

#[tokio::test]
async fn unsubscribing_the_last_subscriber_cancels_the_upstream_and_forgets_the_deployment() {
    let hub = LogHub::new();
    let deployment_id = "dep-1".to_string();
    let cancel = CancellationToken::new();
    hub.register(deployment_id.clone(), cancel.clone());
    let (id, _rx) = hub.subscribe(&deployment_id).unwrap();

    hub.unsubscribe(&deployment_id, id);

    assert!(cancel.is_cancelled());
    assert!(hub.subscribe(&deployment_id).is_none());
}

#[tokio::test]
async fn an_eof_chunk_is_delivered_then_closes_every_subscriber_channel() {
    let hub = LogHub::new();
    let deployment_id = "dep-1".to_string();
    hub.register(deployment_id.clone(), CancellationToken::new());
    let (_id, mut rx) = hub.subscribe(&deployment_id).unwrap();

    hub.broadcast(&deployment_id, line("dep-1", 0));
    hub.broadcast(&deployment_id, LogChunk::eof("dep-1"));

    let first = rx.recv().await.unwrap();
    assert!(!first.is_eof);
    let second = rx.recv().await.unwrap();
    assert!(second.is_eof);
    assert!(rx.recv().await.is_none(), "channel closes after eof");
}

#[tokio::test]
async fn spawn_relay_forwards_chunks_from_the_upstream_channel() {
    let hub = LogHub::new();
    let deployment_id = "dep-1".to_string();
    hub.register(deployment_id.clone(), CancellationToken::new());
    let (_id, mut rx) = hub.subscribe(&deployment_id).unwrap();

    let (tx, upstream_rx) = tokio::sync::mpsc::channel(8);
    hub.spawn_relay(deployment_id.clone(), upstream_rx);
    tx.send(line("dep-1", 1)).await.unwrap();
    tx.send(LogChunk::eof("dep-1")).await.unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.message, b"line 1");
    let second = rx.recv().await.unwrap();
    assert!(second.is_eof);
}
