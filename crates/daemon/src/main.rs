// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit Trail Daemon (traild)
//!
//! Accepts producer sessions and appends their audit events to the ledger.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod config;
mod lifecycle;

use std::path::PathBuf;

use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::config::Config;
use crate::lifecycle::{Daemon, LifecycleError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments
    let config_path = std::env::args().nth(1).map(PathBuf::from);

    // Load configuration
    let config = Config::load(config_path.as_deref())?;

    // Set up logging
    let _log_guard = setup_logging(&config)?;

    info!(
        config = ?config_path,
        transport = %config.transport,
        "Starting traild"
    );

    let Daemon {
        config,
        lock,
        ingress,
    } = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let local_addr = ingress.local_addr()?;
    info!(
        lock = %lock.path().display(),
        "Daemon ready, listening on {}", local_addr
    );

    // Signal ready for parent process; tests bind port 0 and read the address here
    println!("READY {}", local_addr);

    tokio::select! {
        _ = ingress.serve(config.coordinator()) => {}

        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
        }

        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down...");
        }
    }

    info!("Shutting down daemon...");
    lock.release();
    info!("Daemon stopped");
    Ok(())
}

/// Install the subscriber; the guard must live until exit to flush the file writer
fn setup_logging(
    config: &Config,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Some(log_path) = &config.log_path else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(None);
    };

    // Create log directory if needed
    let dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;
    let file_name = log_path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("log_path has no file name: {}", log_path.display()),
        )
    })?;

    // Set up file appender
    let file_appender = tracing_appender::rolling::never(&dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(Some(guard))
}
