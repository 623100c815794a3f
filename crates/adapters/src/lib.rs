// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Transport adapters for audit event sessions

pub mod traced;
pub mod transport;

pub use traced::{TracedListener, TracedSession};
pub use transport::{
    TcpSession, TcpTransport, TransportError, TransportKind, TransportLimits, TransportListener,
    TransportSession, UdpSession, UdpTransport,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use transport::{FakeListener, FakeSession, FakeStep, TransportCall};
