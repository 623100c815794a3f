// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the ingestion engine

use crate::queue::QueueError;
use thiserror::Error;
use trail_adapters::TransportError;
use trail_storage::LedgerError;

/// Errors that can end a session abnormally
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("audit writer task failed: {0}")]
    WriterJoin(String),
}
