// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const SHORT: Duration = Duration::from_millis(20);

#[tokio::test]
async fn events_are_taken_in_arrival_order() {
    let (tx, mut rx) = ingestion_queue();
    for i in 0..5 {
        tx.put(AuditEvent::login(format!("user-{}", i), i)).unwrap();
    }
    assert_eq!(rx.len(), 5);

    for i in 0..5 {
        match rx.take_with_timeout(SHORT).await {
            Polled::Event(event) => assert_eq!(event.user, format!("user-{}", i)),
            other => panic!("expected event, got {:?}", other),
        }
    }
    assert!(rx.is_empty());
}

#[tokio::test]
async fn empty_queue_times_out() {
    let (_tx, mut rx) = ingestion_queue();
    assert_eq!(rx.take_with_timeout(SHORT).await, Polled::TimedOut);
}

#[tokio::test]
async fn dropped_sender_reports_disconnected_after_drain() {
    let (tx, mut rx) = ingestion_queue();
    tx.put(AuditEvent::login("alice", 1)).unwrap();
    drop(tx);

    assert!(matches!(
        rx.take_with_timeout(SHORT).await,
        Polled::Event(_)
    ));
    assert_eq!(rx.take_with_timeout(SHORT).await, Polled::Disconnected);
}

#[tokio::test]
async fn put_fails_once_receiver_is_gone() {
    let (tx, rx) = ingestion_queue();
    drop(rx);

    assert_eq!(tx.put(AuditEvent::login("alice", 1)), Err(QueueError::Closed));
}
