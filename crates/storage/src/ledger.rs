// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only ledger file for audit records

use crate::record::{format_begin, format_end, format_record};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use trail_core::{AuditEvent, Clock, EventKind, SystemClock};

/// Errors that can occur in ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("{0} events are not ledger records")]
    NotARecord(EventKind),
}

/// Destination for formatted audit records
///
/// The writer task depends on this seam rather than on the file so that
/// storage behavior (latency, failures) can be substituted in tests.
pub trait RecordSink: Send + 'static {
    /// Append one data record and return its sequence number
    ///
    /// The accepted counter advances before the write is attempted, so it
    /// counts attempts even when the write itself fails.
    fn append(&mut self, event: &AuditEvent) -> Result<u64, LedgerError>;

    /// Records accepted since the current session began
    fn accepted(&self) -> u64;
}

/// Append-only ledger shared by all sessions of the process
///
/// Sessions accumulate sequentially in one file, each delimited by a BEGIN
/// and an END marker line. The file is opened in append mode and never
/// truncated.
pub struct AuditLedger<C: Clock = SystemClock> {
    path: PathBuf,
    file: File,
    accepted: u64,
    clock: C,
}

impl AuditLedger<SystemClock> {
    /// Open or create the ledger at the given path
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        Self::open_with_clock(path, SystemClock)
    }
}

impl<C: Clock> AuditLedger<C> {
    /// Open or create the ledger, stamping markers with `clock`
    pub fn open_with_clock(path: &Path, clock: C) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let existed = path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::debug!(path = %path.display(), existed, "ledger opened");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            accepted: 0,
            clock,
        })
    }

    /// Start a session: reset the counter and write the BEGIN marker
    pub fn begin(&mut self) -> Result<(), LedgerError> {
        self.accepted = 0;
        let line = format_begin(self.clock.now());
        self.write_line(&line)
    }

    /// Close a session normally: write the END marker with the final count
    pub fn end(&mut self) -> Result<(), LedgerError> {
        let line = format_end(self.clock.now(), self.accepted, false);
        self.write_line(&line)
    }

    /// Close a session that ended without a SESSION_END signal
    pub fn end_aborted(&mut self) -> Result<(), LedgerError> {
        let line = format_end(self.clock.now(), self.accepted, true);
        self.write_line(&line)
    }

    /// Flush and release the file
    pub fn close(self) -> Result<(), LedgerError> {
        self.file.sync_all()?;
        tracing::debug!(path = %self.path.display(), "ledger closed");
        Ok(())
    }

    /// Records accepted since the last BEGIN marker
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Get the path to the ledger file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&mut self, line: &str) -> Result<(), LedgerError> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        self.file.write_all(&buf)?;
        // Every line reaches stable storage before the next one is accepted
        self.file.sync_all()?;
        Ok(())
    }
}

impl<C: Clock> RecordSink for AuditLedger<C> {
    fn append(&mut self, event: &AuditEvent) -> Result<u64, LedgerError> {
        if !event.kind.is_record() {
            return Err(LedgerError::NotARecord(event.kind));
        }

        self.accepted += 1;
        let sequence = self.accepted;
        let line = format_record(sequence, event);
        self.write_line(&line)?;
        Ok(sequence)
    }

    fn accepted(&self) -> u64 {
        self.accepted
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
