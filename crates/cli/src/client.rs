// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Producer-side session for CLI commands

use std::time::Duration;

use thiserror::Error;
use trail_adapters::{
    TcpSession, TransportError, TransportKind, TransportLimits, TransportSession, UdpSession,
};
use trail_core::{AuditEvent, Clock, EventKind, SystemClock};

/// Thread label stamped on events when none is given
pub const DEFAULT_LABEL: &str = "trail-client";

// Timeout configuration (env vars in milliseconds)
fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for establishing the session
pub fn timeout_connect() -> Duration {
    parse_duration_ms("TRAIL_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

/// Timeout for a single send
pub fn timeout_send() -> Duration {
    parse_duration_ms("TRAIL_TIMEOUT_SEND_MS").unwrap_or(Duration::from_secs(5))
}

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Timed out after {0:?} while {1}")]
    Timeout(Duration, &'static str),
}

/// One producer session against the audit service
pub struct Producer<C: Clock = SystemClock> {
    session: Box<dyn TransportSession>,
    clock: C,
    label: String,
    sent: u64,
}

impl Producer<SystemClock> {
    /// Open a session to the service at `addr`
    pub async fn connect(kind: TransportKind, addr: &str) -> Result<Self, ClientError> {
        let limits = TransportLimits::default();
        let connect = async {
            let session: Box<dyn TransportSession> = match kind {
                TransportKind::Tcp => Box::new(TcpSession::connect(addr, limits).await?),
                TransportKind::Udp => Box::new(UdpSession::connect(addr, limits).await?),
            };
            Ok::<_, TransportError>(session)
        };
        let timeout = timeout_connect();
        let session = tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| ClientError::Timeout(timeout, "connecting"))??;

        tracing::debug!(transport = %kind, addr, "producer session opened");
        Ok(Self::with_session(session, SystemClock, DEFAULT_LABEL))
    }
}

impl<C: Clock> Producer<C> {
    pub fn with_session(
        session: Box<dyn TransportSession>,
        clock: C,
        label: impl Into<String>,
    ) -> Self {
        Self {
            session,
            clock,
            label: label.into(),
            sent: 0,
        }
    }

    /// Build an event stamped with the current time and this producer's label
    pub fn event(&self, kind: EventKind, user: &str, payload: Option<String>) -> AuditEvent {
        let mut event = AuditEvent::new(kind, user, self.clock.epoch_millis())
            .with_threads(self.label.clone(), self.label.clone());
        event.payload = payload;
        event
    }

    /// Send one audit event
    pub async fn audit(
        &mut self,
        kind: EventKind,
        user: &str,
        payload: Option<String>,
    ) -> Result<AuditEvent, ClientError> {
        let event = self.event(kind, user, payload);
        self.send(&event).await?;
        self.sent += 1;
        Ok(event)
    }

    /// Send SESSION_END and close; returns the number of audit events sent
    pub async fn finish(mut self) -> Result<u64, ClientError> {
        let end = AuditEvent::session_end(self.clock.epoch_millis())
            .with_threads(self.label.clone(), self.label.clone());
        self.send(&end).await?;
        self.session.close().await?;
        Ok(self.sent)
    }

    pub fn peer(&self) -> String {
        self.session.peer()
    }

    async fn send(&mut self, event: &AuditEvent) -> Result<(), ClientError> {
        let timeout = timeout_send();
        tokio::time::timeout(timeout, self.session.send(event))
            .await
            .map_err(|_| ClientError::Timeout(timeout, "sending"))??;
        tracing::debug!(kind = %event.kind, user = %event.user, "event sent");
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
