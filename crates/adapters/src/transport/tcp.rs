// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream transport over TCP

use super::codec::{read_frame, write_frame};
use super::{resolve, TransportError, TransportLimits, TransportListener, TransportSession};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use trail_core::AuditEvent;

/// Listening TCP endpoint; every accepted connection is one session
pub struct TcpTransport {
    listener: TcpListener,
    limits: TransportLimits,
}

impl TcpTransport {
    /// Bind the listening endpoint
    pub async fn bind(addr: &str, limits: TransportLimits) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, limits })
    }
}

#[async_trait]
impl TransportListener for TcpTransport {
    type Session = TcpSession;

    async fn accept(&mut self) -> Result<TcpSession, TransportError> {
        let (stream, peer) = self.listener.accept().await?;
        Ok(TcpSession::new(stream, peer, self.limits))
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.listener.local_addr()?)
    }
}

/// One TCP connection carrying framed events
pub struct TcpSession {
    stream: TcpStream,
    peer: SocketAddr,
    limits: TransportLimits,
    closed: bool,
}

impl TcpSession {
    fn new(stream: TcpStream, peer: SocketAddr, limits: TransportLimits) -> Self {
        Self {
            stream,
            peer,
            limits,
            closed: false,
        }
    }

    /// Open a producer-side session to a listening service
    pub async fn connect(addr: &str, limits: TransportLimits) -> Result<Self, TransportError> {
        let peer = resolve(addr).await?;
        let stream = TcpStream::connect(peer).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream, peer, limits))
    }
}

#[async_trait]
impl TransportSession for TcpSession {
    async fn send(&mut self, event: &AuditEvent) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        write_frame(&mut self.stream, event, self.limits.max_frame_bytes).await
    }

    async fn receive(&mut self) -> Result<AuditEvent, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        read_frame(&mut self.stream, self.limits.max_frame_bytes).await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.shutdown().await {
            Ok(()) => Ok(()),
            // Peer already hung up
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn peer(&self) -> String {
        format!("tcp://{}", self.peer)
    }
}

#[cfg(test)]
#[path = "tcp_tests.rs"]
mod tests;
