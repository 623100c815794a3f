// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod replay;
pub mod send;

use trail_adapters::TransportKind;

/// Where producer sessions are opened
#[derive(Debug, Clone)]
pub struct Target {
    pub transport: TransportKind,
    pub addr: String,
}
