// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted transport for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{TransportError, TransportListener, TransportSession};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use trail_core::AuditEvent;

/// One scripted result of `receive()`
#[derive(Debug, Clone)]
pub enum FakeStep {
    /// Deliver this event
    Event(AuditEvent),
    /// Fail with a connection reset carrying this message
    Fail(String),
    /// Sleep before moving to the next step
    Pause(Duration),
}

/// Recorded transport call
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Accept,
    Receive { session: u64 },
    Send { session: u64, event: AuditEvent },
    Close { session: u64 },
}

enum FakeAccept {
    Session(Vec<FakeStep>),
    Fail(String),
}

/// Fake listener handing out scripted sessions in order
///
/// Once every script has been handed out, `accept()` fails with
/// [`TransportError::ConnectionClosed`].
#[derive(Clone, Default)]
pub struct FakeListener {
    accepts: Arc<Mutex<VecDeque<FakeAccept>>>,
    calls: Arc<Mutex<Vec<TransportCall>>>,
    next_id: Arc<Mutex<u64>>,
}

impl FakeListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a session whose `receive()` calls follow `steps`
    ///
    /// When the steps run out, `receive()` reports the peer as gone.
    pub fn push_session(&self, steps: Vec<FakeStep>) -> &Self {
        self.lock_accepts().push_back(FakeAccept::Session(steps));
        self
    }

    /// Queue a session delivering `events` in order
    pub fn push_events(&self, events: Vec<AuditEvent>) -> &Self {
        self.push_session(events.into_iter().map(FakeStep::Event).collect())
    }

    /// Queue an `accept()` failure
    pub fn push_accept_failure(&self, message: &str) -> &Self {
        self.lock_accepts()
            .push_back(FakeAccept::Fail(message.to_string()));
        self
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of close() calls recorded for a session
    pub fn close_count(&self, session: u64) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, TransportCall::Close { session: s } if *s == session))
            .count()
    }

    fn lock_accepts(&self) -> std::sync::MutexGuard<'_, VecDeque<FakeAccept>> {
        self.accepts.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: TransportCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl TransportListener for FakeListener {
    type Session = FakeSession;

    async fn accept(&mut self) -> Result<FakeSession, TransportError> {
        self.record(TransportCall::Accept);

        let next = self.lock_accepts().pop_front();
        match next {
            Some(FakeAccept::Session(steps)) => {
                let id = {
                    let mut next_id = self.next_id.lock().unwrap_or_else(|e| e.into_inner());
                    *next_id += 1;
                    *next_id
                };
                Ok(FakeSession {
                    id,
                    steps: steps.into(),
                    calls: Arc::clone(&self.calls),
                    closed: false,
                })
            }
            Some(FakeAccept::Fail(message)) => Err(TransportError::Io(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                message,
            ))),
            None => Err(TransportError::ConnectionClosed),
        }
    }

    fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
    }
}

/// Session produced by [`FakeListener`]
pub struct FakeSession {
    id: u64,
    steps: VecDeque<FakeStep>,
    calls: Arc<Mutex<Vec<TransportCall>>>,
    closed: bool,
}

impl FakeSession {
    pub fn id(&self) -> u64 {
        self.id
    }

    fn record(&self, call: TransportCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl TransportSession for FakeSession {
    async fn send(&mut self, event: &AuditEvent) -> Result<(), TransportError> {
        self.record(TransportCall::Send {
            session: self.id,
            event: event.clone(),
        });
        if self.closed {
            return Err(TransportError::Closed);
        }
        Ok(())
    }

    async fn receive(&mut self) -> Result<AuditEvent, TransportError> {
        self.record(TransportCall::Receive { session: self.id });
        if self.closed {
            return Err(TransportError::Closed);
        }

        loop {
            match self.steps.pop_front() {
                Some(FakeStep::Event(event)) => return Ok(event),
                Some(FakeStep::Fail(message)) => {
                    return Err(TransportError::Io(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        message,
                    )))
                }
                Some(FakeStep::Pause(duration)) => tokio::time::sleep(duration).await,
                None => return Err(TransportError::ConnectionClosed),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.record(TransportCall::Close { session: self.id });
        self.closed = true;
        Ok(())
    }

    fn peer(&self) -> String {
        format!("fake://{}", self.id)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
