// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! trail-core: shared types for the audit trail service
//!
//! This crate provides:
//! - The audit event PDU exchanged with the upstream producer
//! - Session and writer state machines
//! - A wall clock abstraction for testable timestamps

pub mod clock;
pub mod event;
pub mod session;

pub use clock::{Clock, FakeClock, SystemClock};
pub use event::{AuditEvent, EventKind};
pub use session::{SessionState, WriterState};
