// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tempfile::TempDir;
use trail_adapters::{TcpSession, TransportLimits, TransportSession, UdpSession};
use trail_core::AuditEvent;

fn test_config(dir: &TempDir, transport: TransportKind) -> Config {
    Config {
        transport,
        bind: "127.0.0.1".to_string(),
        port: 0,
        ledger_path: dir.path().join("ledger").join("audit.log"),
        backoff: Duration::from_millis(10),
        poll_interval: Duration::from_millis(20),
        ..Config::default()
    }
}

async fn wait_for_end_marker(path: &Path) -> String {
    for _ in 0..200 {
        if let Ok(content) = std::fs::read_to_string(path) {
            if content.contains("*** END audit session") {
                return content;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("ledger never received an END marker");
}

#[tokio::test]
async fn startup_creates_ledger_dir_and_lock() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, TransportKind::Tcp);

    let daemon = startup(&config).await.unwrap();

    assert!(config.lock_path().exists());
    assert_eq!(daemon.lock.path(), config.lock_path());
    let pid = std::fs::read_to_string(config.lock_path()).unwrap();
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert_ne!(daemon.ingress.local_addr().unwrap().port(), 0);

    daemon.lock.release();
    assert!(!config.lock_path().exists());
}

#[tokio::test]
async fn second_daemon_on_same_ledger_is_refused() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, TransportKind::Tcp);
    let _first = startup(&config).await.unwrap();

    let second = startup(&config).await;

    assert!(matches!(second, Err(LifecycleError::LockFailed(_))));
}

#[tokio::test]
async fn bind_failure_releases_lock() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        bind: "not-a-host.invalid".to_string(),
        ..test_config(&dir, TransportKind::Tcp)
    };

    let result = startup(&config).await;

    assert!(matches!(result, Err(LifecycleError::BindFailed(..))));
    assert!(!config.lock_path().exists());
}

#[tokio::test]
async fn tcp_ingress_serves_sessions() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, TransportKind::Tcp);
    let daemon = startup(&config).await.unwrap();
    let addr = daemon.ingress.local_addr().unwrap().to_string();
    let server = tokio::spawn(daemon.ingress.serve(config.coordinator()));

    let mut client = TcpSession::connect(&addr, TransportLimits::default())
        .await
        .unwrap();
    client.send(&AuditEvent::login("alice", 1)).await.unwrap();
    client
        .send(&AuditEvent::chat_message("alice", "over tcp", 2))
        .await
        .unwrap();
    client.send(&AuditEvent::session_end(3)).await.unwrap();

    let ledger = wait_for_end_marker(&config.ledger_path).await;
    server.abort();

    assert!(ledger.contains("LOGIN | alice"));
    assert!(ledger.contains("| over tcp"));
    assert!(ledger.contains("records: 2 ***"));
}

#[tokio::test]
async fn udp_ingress_serves_sessions() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, TransportKind::Udp);
    let daemon = startup(&config).await.unwrap();
    let addr = daemon.ingress.local_addr().unwrap().to_string();
    let server = tokio::spawn(daemon.ingress.serve(config.coordinator()));

    let mut client = UdpSession::connect(&addr, TransportLimits::default())
        .await
        .unwrap();
    client.send(&AuditEvent::login("bob", 1)).await.unwrap();
    client.send(&AuditEvent::logout("bob", 2)).await.unwrap();
    client.send(&AuditEvent::session_end(3)).await.unwrap();

    let ledger = wait_for_end_marker(&config.ledger_path).await;
    server.abort();

    assert!(ledger.contains("LOGIN | bob"));
    assert!(ledger.contains("LOGOUT | bob"));
    assert!(ledger.contains("records: 2 ***"));
}
