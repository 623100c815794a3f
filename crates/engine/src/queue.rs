// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unbounded FIFO handoff between network receipt and persistence

use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use trail_core::AuditEvent;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The consuming writer is gone; the event was not enqueued
    #[error("ingestion queue closed: writer is gone")]
    Closed,
}

/// Result of a timed take
#[derive(Debug, PartialEq)]
pub enum Polled {
    Event(AuditEvent),
    /// Nothing arrived within the timeout
    TimedOut,
    /// The producer side is gone and every queued event has been taken
    Disconnected,
}

/// Create a fresh queue for one session
pub fn ingestion_queue() -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (QueueSender { tx }, QueueReceiver { rx })
}

/// Producer end, held by the session coordinator
pub struct QueueSender {
    tx: mpsc::UnboundedSender<AuditEvent>,
}

impl QueueSender {
    /// Enqueue an event
    ///
    /// Never blocks and never drops; fails only if the writer has gone away.
    pub fn put(&self, event: AuditEvent) -> Result<(), QueueError> {
        self.tx.send(event).map_err(|_| QueueError::Closed)
    }
}

/// Consumer end, owned by the audit writer
pub struct QueueReceiver {
    rx: mpsc::UnboundedReceiver<AuditEvent>,
}

impl QueueReceiver {
    /// Wait up to `timeout` for the next event in arrival order
    pub async fn take_with_timeout(&mut self, timeout: Duration) -> Polled {
        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(event)) => Polled::Event(event),
            Ok(None) => Polled::Disconnected,
            Err(_) => Polled::TimedOut,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
