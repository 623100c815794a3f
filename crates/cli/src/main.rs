// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! trail - Audit Trail producer client

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{replay, send, Target};
use trail_adapters::TransportKind;

#[derive(Parser)]
#[command(
    name = "trail",
    version,
    about = "Audit Trail - send audit events to a running traild"
)]
struct Cli {
    /// Transport to the service (tcp or udp)
    #[arg(long, global = true, default_value = "tcp")]
    transport: TransportKind,

    /// Service address
    #[arg(long, global = true, default_value = "127.0.0.1:40001")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one event in its own session
    Send(send::SendArgs),
    /// Replay a login, chat messages and logout
    Replay(replay::ReplayArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    let target = Target {
        transport: cli.transport,
        addr: cli.addr,
    };

    match cli.command {
        Commands::Send(args) => send::send(&target, args).await,
        Commands::Replay(args) => replay::replay(&target, args).await,
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
