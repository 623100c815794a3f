// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-oriented transports for audit events
//!
//! Both bindings expose the same shape: a listener that yields one producer
//! session at a time, and a session that sends and receives whole events.
//!
//! - TCP: every event is a length-prefixed JSON frame on the stream.
//! - UDP: every datagram carries one JSON event; a session is synthesized
//!   from the first datagram and bound to its sender.

pub mod codec;
mod tcp;
mod udp;

pub use tcp::{TcpSession, TcpTransport};
pub use udp::{UdpSession, UdpTransport};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeListener, FakeSession, FakeStep, TransportCall};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;
use trail_core::AuditEvent;

/// Default cap on a single stream frame in bytes
pub const DEFAULT_MAX_FRAME_BYTES: usize = 800_000;
/// Largest UDP payload over IPv4
pub const DEFAULT_MAX_DATAGRAM_BYTES: usize = 65_507;

/// Errors from transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid event encoding: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("connection closed by peer")]
    ConnectionClosed,
    #[error("message of {size} bytes exceeds limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },
    #[error("could not resolve address: {0}")]
    Resolve(String),
    #[error("session already closed")]
    Closed,
}

/// Size limits applied by the bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportLimits {
    pub max_frame_bytes: usize,
    pub max_datagram_bytes: usize,
}

impl Default for TransportLimits {
    fn default() -> Self {
        Self {
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            max_datagram_bytes: DEFAULT_MAX_DATAGRAM_BYTES,
        }
    }
}

/// Which binding a listener or client uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Tcp,
    Udp,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Tcp => f.write_str("tcp"),
            TransportKind::Udp => f.write_str("udp"),
        }
    }
}

impl FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tcp" => Ok(TransportKind::Tcp),
            "udp" => Ok(TransportKind::Udp),
            other => Err(format!("unknown transport '{}', expected tcp or udp", other)),
        }
    }
}

/// Accepts producer sessions, one at a time
#[async_trait]
pub trait TransportListener: Send + 'static {
    type Session: TransportSession;

    /// Block until a producer session begins
    async fn accept(&mut self) -> Result<Self::Session, TransportError>;

    /// Address the listener is bound to
    fn local_addr(&self) -> Result<SocketAddr, TransportError>;
}

/// One producer session
#[async_trait]
pub trait TransportSession: Send + 'static {
    /// Send an event to the peer
    async fn send(&mut self, event: &AuditEvent) -> Result<(), TransportError>;

    /// Block until the next event arrives
    ///
    /// Fails when the peer closes the session or the transport breaks.
    async fn receive(&mut self) -> Result<AuditEvent, TransportError>;

    /// Release the session; further calls fail with [`TransportError::Closed`]
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Human-readable peer identity for logs
    fn peer(&self) -> String;
}

/// Resolve `addr` to the first socket address it names
pub(crate) async fn resolve(addr: &str) -> Result<SocketAddr, TransportError> {
    tokio::net::lookup_host(addr)
        .await?
        .next()
        .ok_or_else(|| TransportError::Resolve(addr.to_string()))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
