// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Datagram transport over UDP
//!
//! UDP has no handshake, so `accept()` waits for the first datagram and
//! binds the session to whoever sent it. That first event is handed out by
//! the session's first `receive()`.

use super::codec::{decode, encode};
use super::{resolve, TransportError, TransportLimits, TransportListener, TransportSession};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use trail_core::AuditEvent;

/// Listening UDP endpoint
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    limits: TransportLimits,
}

impl UdpTransport {
    /// Bind the listening endpoint
    pub async fn bind(addr: &str, limits: TransportLimits) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket: Arc::new(socket),
            limits,
        })
    }
}

#[async_trait]
impl TransportListener for UdpTransport {
    type Session = UdpSession;

    async fn accept(&mut self) -> Result<UdpSession, TransportError> {
        let mut buf = vec![0u8; self.limits.max_datagram_bytes];
        let (len, peer) = self.socket.recv_from(&mut buf).await?;
        let first = decode(&buf[..len])?;

        Ok(UdpSession {
            socket: Arc::clone(&self.socket),
            peer,
            pending: Some(first),
            limits: self.limits,
            connected: false,
            closed: false,
        })
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }
}

/// Datagram exchange with a single peer
pub struct UdpSession {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
    /// Event that opened a server-side session, not yet received
    pending: Option<AuditEvent>,
    limits: TransportLimits,
    /// Producer-side sockets are connected to the service address
    connected: bool,
    closed: bool,
}

impl UdpSession {
    /// Open a producer-side session to a listening service
    pub async fn connect(addr: &str, limits: TransportLimits) -> Result<Self, TransportError> {
        let peer = resolve(addr).await?;
        let local = if peer.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(peer).await?;

        Ok(Self {
            socket: Arc::new(socket),
            peer,
            pending: None,
            limits,
            connected: true,
            closed: false,
        })
    }
}

#[async_trait]
impl TransportSession for UdpSession {
    async fn send(&mut self, event: &AuditEvent) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }

        let bytes = encode(event)?;
        if bytes.len() > self.limits.max_datagram_bytes {
            return Err(TransportError::TooLarge {
                size: bytes.len(),
                limit: self.limits.max_datagram_bytes,
            });
        }

        if self.connected {
            self.socket.send(&bytes).await?;
        } else {
            self.socket.send_to(&bytes, self.peer).await?;
        }
        Ok(())
    }

    async fn receive(&mut self) -> Result<AuditEvent, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        if let Some(event) = self.pending.take() {
            return Ok(event);
        }

        let mut buf = vec![0u8; self.limits.max_datagram_bytes];
        loop {
            let (len, from) = self.socket.recv_from(&mut buf).await?;
            if from != self.peer {
                tracing::debug!(%from, peer = %self.peer, "ignoring datagram from foreign peer");
                continue;
            }
            return decode(&buf[..len]);
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        // The listening socket outlives the session; only this view closes
        self.closed = true;
        self.pending = None;
        Ok(())
    }

    fn peer(&self) -> String {
        format!("udp://{}", self.peer)
    }
}

#[cfg(test)]
#[path = "udp_tests.rs"]
mod tests;
