// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI integration tests
//!
//! A listener bound inside the test plays the audit service, so the events
//! the binary puts on the wire can be inspected directly.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use trail_adapters::{
    TcpTransport, TransportLimits, TransportListener, TransportSession, UdpTransport,
};
use trail_core::{AuditEvent, EventKind};

async fn receive_session(session: &mut impl TransportSession) -> Vec<AuditEvent> {
    let mut events = Vec::new();
    loop {
        let event = session.receive().await.unwrap();
        let end = event.is_session_end();
        events.push(event);
        if end {
            return events;
        }
    }
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("trail")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("send"))
        .stdout(predicate::str::contains("replay"));
}

#[test]
fn unknown_transport_is_rejected() {
    Command::cargo_bin("trail")
        .unwrap()
        .args(["--transport", "sctp", "send", "--user", "u", "login"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown transport"));
}

#[test]
fn send_fails_without_service() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    Command::cargo_bin("trail")
        .unwrap()
        .args(["--addr", &format!("127.0.0.1:{}", port)])
        .args(["send", "--user", "alice", "login"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to reach audit service"));
}

#[tokio::test(flavor = "multi_thread")]
async fn replay_sends_scripted_session() {
    let mut listener = TcpTransport::bind("127.0.0.1:0", TransportLimits::default())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let cli = tokio::task::spawn_blocking(move || {
        Command::cargo_bin("trail")
            .unwrap()
            .args(["--addr", &addr])
            .args(["replay", "--user", "mandl", "--messages", "3", "--length", "5"])
            .assert()
            .success()
            .stdout(predicate::str::contains("3. message sent, length = 5"))
            .stdout(predicate::str::contains("Session finished: 5 events"));
    });

    let mut session = listener.accept().await.unwrap();
    let events = receive_session(&mut session).await;
    cli.await.unwrap();

    let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Login,
            EventKind::ChatMessage,
            EventKind::ChatMessage,
            EventKind::ChatMessage,
            EventKind::Logout,
            EventKind::SessionEnd,
        ]
    );
    assert!(events.iter().all(|e| e.timestamp > 0));
    assert_eq!(events[0].user, "mandl");
    assert_eq!(events[1].payload.as_deref(), Some("AAAAA"));
    assert_eq!(events[4].payload, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn send_chat_over_udp() {
    let mut listener = UdpTransport::bind("127.0.0.1:0", TransportLimits::default())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let cli = tokio::task::spawn_blocking(move || {
        Command::cargo_bin("trail")
            .unwrap()
            .args(["--transport", "udp", "--addr", &addr])
            .args(["send", "--user", "bob", "chat", "hello there"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Sent CHAT_MESSAGE for bob"));
    });

    let mut session = listener.accept().await.unwrap();
    let events = receive_session(&mut session).await;
    cli.await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, EventKind::ChatMessage);
    assert_eq!(events[0].payload.as_deref(), Some("hello there"));
    assert!(events[1].is_session_end());
}
