// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, serving, shutdown.

use std::fs::File;
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::{info, warn};
use trail_adapters::{
    TcpTransport, TracedListener, TransportError, TransportKind, TransportListener, UdpTransport,
};
use trail_engine::{CoordinatorConfig, SessionCoordinator};

use crate::config::Config;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock: daemon already running on this ledger?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind {0}: {1}")]
    BindFailed(String, #[source] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bound listener of the configured transport kind
pub enum Ingress {
    Tcp(TracedListener<TcpTransport>),
    Udp(TracedListener<UdpTransport>),
}

impl Ingress {
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        match self {
            Ingress::Tcp(listener) => listener.local_addr(),
            Ingress::Udp(listener) => listener.local_addr(),
        }
    }

    /// Serve producer sessions until the future is dropped
    pub async fn serve(self, config: CoordinatorConfig) {
        match self {
            Ingress::Tcp(listener) => {
                let mut coordinator = SessionCoordinator::new(listener, config);
                coordinator.run().await
            }
            Ingress::Udp(listener) => {
                let mut coordinator = SessionCoordinator::new(listener, config);
                coordinator.run().await
            }
        }
    }
}

/// Exclusive advisory lock on `<ledger>.lock`
pub struct LedgerLock {
    path: PathBuf,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    file: File,
}

impl LedgerLock {
    pub fn acquire(path: PathBuf) -> Result<Self, LifecycleError> {
        let mut file = File::create(&path)?;
        file.try_lock_exclusive()
            .map_err(LifecycleError::LockFailed)?;

        // Write PID to lock file
        writeln!(file, "{}", std::process::id())?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unlock and remove the lock file
    pub fn release(self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Failed to release ledger lock: {}", e);
        }
        drop(self.file);
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!("Failed to remove lock file: {}", e);
            }
        }
    }
}

/// Daemon state during operation
pub struct Daemon {
    pub config: Config,
    pub lock: LedgerLock,
    pub ingress: Ingress,
}

/// Start the daemon: lock the ledger, then bind the listener
pub async fn startup(config: &Config) -> Result<Daemon, LifecycleError> {
    // 1. Create the ledger directory (needed for the lock)
    if let Some(parent) = config.ledger_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // 2. Acquire lock FIRST - two daemons must never append to one ledger
    let lock = LedgerLock::acquire(config.lock_path())?;

    // 3. Bind (LAST - only after the lock is held)
    let addr = config.listen_addr();
    let limits = config.limits();
    let bound = match config.transport {
        TransportKind::Tcp => TcpTransport::bind(&addr, limits)
            .await
            .map(|t| Ingress::Tcp(TracedListener::new(t))),
        TransportKind::Udp => UdpTransport::bind(&addr, limits)
            .await
            .map(|t| Ingress::Udp(TracedListener::new(t))),
    };
    let ingress = match bound {
        Ok(ingress) => ingress,
        Err(e) => {
            lock.release();
            return Err(LifecycleError::BindFailed(addr, e));
        }
    };

    info!(
        transport = %config.transport,
        addr = %addr,
        ledger = %config.ledger_path.display(),
        "Daemon started"
    );

    Ok(Daemon {
        config: config.clone(),
        lock,
        ingress,
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
