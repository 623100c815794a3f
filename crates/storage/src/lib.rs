// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Append-only audit ledger
//!
//! ```text
//! AuditEvent → format_record → AuditLedger → disk (one line per record)
//! ```
//!
//! Every line is fsync'd before the write returns, so the ledger can be
//! tailed while sessions are in progress.

mod ledger;
pub mod record;

pub use ledger::{AuditLedger, LedgerError, RecordSink};
