// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced transport wrappers for consistent observability

use crate::transport::{TransportError, TransportListener, TransportSession};
use async_trait::async_trait;
use std::net::SocketAddr;
use trail_core::AuditEvent;

/// Wrapper that adds tracing to any TransportListener
pub struct TracedListener<L> {
    inner: L,
}

impl<L> TracedListener<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<L: TransportListener> TransportListener for TracedListener<L> {
    type Session = TracedSession<L::Session>;

    async fn accept(&mut self) -> Result<Self::Session, TransportError> {
        let local = self
            .inner
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_default();
        tracing::info!(local = %local, "waiting for producer session");

        let start = std::time::Instant::now();
        let result = self.inner.accept().await;
        let elapsed = start.elapsed();

        match result {
            Ok(session) => {
                tracing::info!(
                    peer = %session.peer(),
                    waited_ms = elapsed.as_millis() as u64,
                    "session accepted"
                );
                Ok(TracedSession::new(session))
            }
            Err(e) => {
                tracing::error!(
                    waited_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "accept failed"
                );
                Err(e)
            }
        }
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.inner.local_addr()
    }
}

/// Wrapper that adds tracing to any TransportSession
pub struct TracedSession<S> {
    inner: S,
    received: u64,
}

impl<S> TracedSession<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, received: 0 }
    }

    /// Events received through this wrapper so far
    pub fn received(&self) -> u64 {
        self.received
    }
}

#[async_trait]
impl<S: TransportSession> TransportSession for TracedSession<S> {
    async fn send(&mut self, event: &AuditEvent) -> Result<(), TransportError> {
        let peer = self.inner.peer();
        tracing::debug!(peer = %peer, kind = %event.kind, user = %event.user, "sending");
        let result = self.inner.send(event).await;

        match &result {
            Ok(()) => tracing::debug!(peer = %peer, "sent"),
            Err(e) => tracing::error!(peer = %peer, error = %e, "send failed"),
        }

        result
    }

    async fn receive(&mut self) -> Result<AuditEvent, TransportError> {
        let result = self.inner.receive().await;

        match &result {
            Ok(event) => {
                self.received += 1;
                tracing::debug!(
                    received = self.received,
                    kind = %event.kind,
                    user = %event.user,
                    payload_len = event.payload.as_ref().map(|p| p.len()),
                    "event received"
                );
                tracing::trace!(?event);
            }
            Err(e) => tracing::warn!(
                peer = %self.inner.peer(),
                received = self.received,
                error = %e,
                "receive failed"
            ),
        }

        result
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let result = self.inner.close().await;
        // close() failing is often acceptable (peer already gone)
        match &result {
            Ok(()) => tracing::info!(peer = %self.inner.peer(), "session closed"),
            Err(e) => tracing::warn!(error = %e, "close failed (may be expected)"),
        }
        result
    }

    fn peer(&self) -> String {
        self.inner.peer()
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
