// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session and writer state machines
//!
//! The coordinator serves one producer session at a time:
//!
//! ```text
//! AwaitingConnection → Active → Draining → Closed
//!         ↑                                  │
//!         └──────────────────────────────────┘
//! ```
//!
//! There is no terminal state; `Closed` always leads back to
//! `AwaitingConnection`.

use std::fmt;

/// Lifecycle state of the session coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    AwaitingConnection,
    /// A producer is connected and events are being received
    Active,
    /// No more events are accepted; the writer is finishing the queue
    Draining,
    /// Session handle and ledger are closed
    Closed,
}

impl SessionState {
    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (SessionState::AwaitingConnection, SessionState::Active)
                | (SessionState::Active, SessionState::Draining)
                | (SessionState::Draining, SessionState::Closed)
                | (SessionState::Closed, SessionState::AwaitingConnection)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::AwaitingConnection => "awaiting_connection",
            SessionState::Active => "active",
            SessionState::Draining => "draining",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Lifecycle state of one audit writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum WriterState {
    #[default]
    Running = 0,
    /// Shutdown requested; the queue is still being drained
    ShuttingDown = 1,
    Shutdown = 2,
}

impl WriterState {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a stored discriminant; unknown values read as `Shutdown`
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => WriterState::Running,
            1 => WriterState::ShuttingDown,
            _ => WriterState::Shutdown,
        }
    }
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriterState::Running => "running",
            WriterState::ShuttingDown => "shutting_down",
            WriterState::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
