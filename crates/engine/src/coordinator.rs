// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session coordinator: the service run loop
//!
//! Each cycle accepts one producer session, opens the ledger, wires a fresh
//! queue to a fresh writer, and forwards received events until the session
//! ends. Whether the session ends with SESSION_END or with a transport
//! failure, the writer is always drained and joined before the next accept.

use crate::error::EngineError;
use crate::queue::ingestion_queue;
use crate::writer::{AuditWriter, WriterHandle, DEFAULT_POLL_INTERVAL};
use std::path::PathBuf;
use std::time::Duration;
use tracing::Instrument;
use trail_adapters::{TransportListener, TransportSession};
use trail_core::{Clock, SessionState, SystemClock};
use trail_storage::AuditLedger;
use uuid::Uuid;

/// Pause between sessions and after failed accepts
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(2000);

/// Coordinator configuration
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Ledger file shared by all sessions
    pub ledger_path: PathBuf,
    /// Delay before accepting again after a session or a failed accept
    pub backoff: Duration,
    /// Writer poll interval
    pub poll_interval: Duration,
}

impl CoordinatorConfig {
    pub fn new(ledger_path: impl Into<PathBuf>) -> Self {
        Self {
            ledger_path: ledger_path.into(),
            backoff: DEFAULT_BACKOFF,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// How one coordinator cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Producer sent SESSION_END; the ledger holds `records` for the session
    Completed { records: u64, received: u64 },
    /// Session ended without SESSION_END
    ///
    /// `records` is `None` when the ledger could not be opened or the
    /// writer could not be joined.
    Aborted {
        records: Option<u64>,
        received: u64,
        reason: String,
    },
    /// No session was established
    AcceptFailed { reason: String },
}

/// Why the receive loop stopped
enum SessionEnd {
    Requested,
    Failed(EngineError),
}

/// Serves producer sessions one at a time, forever
pub struct SessionCoordinator<L: TransportListener, C: Clock = SystemClock> {
    listener: L,
    config: CoordinatorConfig,
    clock: C,
    state: SessionState,
}

impl<L: TransportListener> SessionCoordinator<L, SystemClock> {
    pub fn new(listener: L, config: CoordinatorConfig) -> Self {
        Self::with_clock(listener, config, SystemClock)
    }
}

impl<L: TransportListener, C: Clock> SessionCoordinator<L, C> {
    pub fn with_clock(listener: L, config: CoordinatorConfig, clock: C) -> Self {
        Self {
            listener,
            config,
            clock,
            state: SessionState::AwaitingConnection,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Serve sessions until the process ends
    pub async fn run(&mut self) {
        tracing::info!(
            ledger = %self.config.ledger_path.display(),
            backoff_ms = self.config.backoff.as_millis() as u64,
            "session coordinator running"
        );
        loop {
            self.run_session().await;
        }
    }

    /// Serve one session, then back off and re-arm for the next accept
    pub async fn run_session(&mut self) -> SessionOutcome {
        let outcome = self.serve_one().await;

        match &outcome {
            SessionOutcome::Completed { records, received } => {
                tracing::info!(records, received, "session completed")
            }
            SessionOutcome::Aborted {
                records,
                received,
                reason,
            } => tracing::warn!(?records, received, reason = %reason, "session aborted"),
            SessionOutcome::AcceptFailed { reason } => {
                tracing::error!(reason = %reason, "no session established")
            }
        }

        tokio::time::sleep(self.config.backoff).await;
        if self.state == SessionState::Closed {
            self.transition(SessionState::AwaitingConnection);
        }
        outcome
    }

    async fn serve_one(&mut self) -> SessionOutcome {
        let session = match self.listener.accept().await {
            Ok(session) => session,
            Err(e) => {
                return SessionOutcome::AcceptFailed {
                    reason: e.to_string(),
                }
            }
        };

        let span = tracing::info_span!(
            "session",
            id = %Uuid::new_v4(),
            peer = %session.peer()
        );
        self.serve(session).instrument(span).await
    }

    async fn serve(&mut self, mut session: L::Session) -> SessionOutcome {
        let mut ledger =
            match AuditLedger::open_with_clock(&self.config.ledger_path, self.clock.clone()) {
                Ok(ledger) => ledger,
                Err(e) => {
                    tracing::error!(error = %e, "failed to open ledger");
                    close_session(&mut session).await;
                    return SessionOutcome::Aborted {
                        records: None,
                        received: 0,
                        reason: EngineError::from(e).to_string(),
                    };
                }
            };
        if let Err(e) = ledger.begin() {
            tracing::error!(error = %e, "failed to write BEGIN marker");
        }

        self.transition(SessionState::Active);
        let (sender, receiver) = ingestion_queue();
        let writer = AuditWriter::new(ledger, receiver)
            .with_poll_interval(self.config.poll_interval)
            .spawn();

        let mut received = 0u64;
        let end = loop {
            match session.receive().await {
                Ok(event) if event.is_session_end() => break SessionEnd::Requested,
                Ok(event) => {
                    received += 1;
                    if let Err(e) = sender.put(event) {
                        break SessionEnd::Failed(e.into());
                    }
                }
                Err(e) => break SessionEnd::Failed(e.into()),
            }
        };

        // Nothing is enqueued past this point
        self.transition(SessionState::Draining);

        let outcome = match end {
            SessionEnd::Requested => {
                tracing::info!(received, "session end requested, draining writer");
                writer.shutdown();
                drop(sender);
                let ledger = join_writer(writer).await;
                close_session(&mut session).await;
                let records = ledger.map(|l| finish_ledger(l, false));
                match records {
                    Some(records) => SessionOutcome::Completed { records, received },
                    None => SessionOutcome::Aborted {
                        records: None,
                        received,
                        reason: "audit writer was lost".to_string(),
                    },
                }
            }
            SessionEnd::Failed(e) => {
                tracing::warn!(received, error = %e, "session ended abnormally, draining writer");
                close_session(&mut session).await;
                writer.shutdown();
                drop(sender);
                let ledger = join_writer(writer).await;
                SessionOutcome::Aborted {
                    records: ledger.map(|l| finish_ledger(l, true)),
                    received,
                    reason: e.to_string(),
                }
            }
        };

        self.transition(SessionState::Closed);
        outcome
    }

    fn transition(&mut self, next: SessionState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!(from = %self.state, to = %next, "unexpected session transition");
        }
        tracing::debug!(from = %self.state, to = %next, "session transition");
        self.state = next;
    }
}

async fn join_writer<C: Clock>(
    writer: WriterHandle<AuditLedger<C>>,
) -> Option<AuditLedger<C>> {
    match writer.join().await {
        Ok(ledger) => Some(ledger),
        Err(e) => {
            tracing::error!(error = %e, "audit writer could not be joined");
            None
        }
    }
}

/// Write the END marker and close the ledger, returning the session count
fn finish_ledger<C: Clock>(mut ledger: AuditLedger<C>, aborted: bool) -> u64 {
    let records = ledger.accepted();
    let marker = if aborted {
        ledger.end_aborted()
    } else {
        ledger.end()
    };
    if let Err(e) = marker {
        tracing::error!(error = %e, "failed to write END marker");
    }
    if let Err(e) = ledger.close() {
        tracing::error!(error = %e, "failed to close ledger");
    }
    records
}

async fn close_session<S: TransportSession>(session: &mut S) {
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "failed to close session");
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
