// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit writer task: drains the ingestion queue into the ledger
//!
//! One writer exists per session. Its state is owned by that instance and
//! shared only with its own [`WriterHandle`], which can request shutdown
//! and wait for the drain to finish.

use crate::error::EngineError;
use crate::queue::{Polled, QueueReceiver};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use trail_core::{AuditEvent, EventKind, WriterState};
use trail_storage::RecordSink;

/// How long a take waits before the writer re-checks its state
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Writer state cell, one per writer instance
#[derive(Debug, Default)]
struct StateCell(AtomicU8);

impl StateCell {
    fn get(&self) -> WriterState {
        WriterState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: WriterState) {
        self.0.store(state.as_u8(), Ordering::Release);
    }

    /// Running → ShuttingDown; later states are left alone
    fn request_shutdown(&self) -> bool {
        self.0
            .compare_exchange(
                WriterState::Running.as_u8(),
                WriterState::ShuttingDown.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// Consumer that writes queued events to a record sink
pub struct AuditWriter<S: RecordSink> {
    sink: S,
    queue: QueueReceiver,
    state: Arc<StateCell>,
    poll_interval: Duration,
}

impl<S: RecordSink> AuditWriter<S> {
    pub fn new(sink: S, queue: QueueReceiver) -> Self {
        Self {
            sink,
            queue,
            state: Arc::new(StateCell::default()),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Start the writer on its own blocking thread
    ///
    /// Ledger appends are synchronous and fsync every line, so they must not
    /// run on a runtime worker that also drives session receive.
    pub fn spawn(self) -> WriterHandle<S> {
        let state = Arc::clone(&self.state);
        let runtime = Handle::current();
        let task = tokio::task::spawn_blocking(move || runtime.block_on(self.run()));
        WriterHandle { state, task }
    }

    /// Drain the queue until shutdown completes, then hand the sink back
    pub async fn run(mut self) -> S {
        tracing::info!("audit writer started");

        while self.state.get() != WriterState::Shutdown {
            match self.queue.take_with_timeout(self.poll_interval).await {
                Polled::Event(event) => self.dispatch(&event),
                Polled::TimedOut => tracing::trace!("queue idle"),
                Polled::Disconnected => {
                    if self.state.get() == WriterState::Running {
                        tracing::warn!("ingestion queue closed without shutdown request");
                    }
                    self.state.set(WriterState::Shutdown);
                    continue;
                }
            }

            if self.state.get() == WriterState::ShuttingDown && self.queue.is_empty() {
                self.state.set(WriterState::Shutdown);
            }
        }

        if !self.queue.is_empty() {
            tracing::warn!(remaining = self.queue.len(), "writer stopped with events queued");
        }
        tracing::info!(accepted = self.sink.accepted(), "audit writer stopped");
        self.sink
    }

    fn dispatch(&mut self, event: &AuditEvent) {
        match event.kind {
            EventKind::Login | EventKind::Logout | EventKind::ChatMessage => {
                match self.sink.append(event) {
                    Ok(sequence) => {
                        tracing::debug!(sequence, kind = %event.kind, user = %event.user, "record written")
                    }
                    // The session's trail continues past a failed write
                    Err(e) => tracing::error!(
                        accepted = self.sink.accepted(),
                        kind = %event.kind,
                        error = %e,
                        "failed to write audit record"
                    ),
                }
            }
            EventKind::SessionEnd => {
                tracing::warn!("control event reached the writer, discarding")
            }
            EventKind::Undefined => {
                tracing::warn!(user = %event.user, "unrecognized event kind, discarding")
            }
        }
    }
}

/// Handle to a running writer
pub struct WriterHandle<S> {
    state: Arc<StateCell>,
    task: JoinHandle<S>,
}

impl<S> WriterHandle<S> {
    /// Ask the writer to stop once the queue is drained
    ///
    /// The caller must have stopped enqueueing before calling this.
    pub fn shutdown(&self) {
        if self.state.request_shutdown() {
            tracing::debug!("audit writer shutdown requested");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the writer to finish and take back its sink
    pub async fn join(self) -> Result<S, EngineError> {
        self.task
            .await
            .map_err(|e| EngineError::WriterJoin(e.to_string()))
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
