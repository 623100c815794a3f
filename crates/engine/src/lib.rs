// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Audit trail ingestion engine
//!
//! ```text
//! TransportListener → SessionCoordinator ─put→ IngestionQueue ─take→ AuditWriter → AuditLedger
//! ```
//!
//! The coordinator serves one producer session at a time. Network receipt
//! and persistence are decoupled by the queue; a session ends with an
//! explicit drain of the writer before the ledger is closed.

mod coordinator;
mod error;
mod queue;
mod writer;

pub use coordinator::{CoordinatorConfig, SessionCoordinator, SessionOutcome};
pub use error::EngineError;
pub use queue::{ingestion_queue, Polled, QueueError, QueueReceiver, QueueSender};
pub use writer::{AuditWriter, WriterHandle, DEFAULT_POLL_INTERVAL};
