// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: TOML file plus environment overrides

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use trail_adapters::{TransportKind, TransportLimits};
use trail_engine::CoordinatorConfig;

/// Port the service listens on when nothing else is configured
pub const DEFAULT_PORT: u16 = 40001;

pub const ENV_PORT: &str = "TRAIL_PORT";
pub const ENV_TRANSPORT: &str = "TRAIL_TRANSPORT";
pub const ENV_LEDGER: &str = "TRAIL_LEDGER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("invalid config {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("invalid value for {var}: {message}")]
    Env { var: &'static str, message: String },
}

/// Daemon configuration
///
/// Every key is optional; missing keys take the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub transport: TransportKind,
    pub bind: String,
    pub port: u16,
    pub ledger_path: PathBuf,
    /// Log file; stderr when unset
    pub log_path: Option<PathBuf>,
    #[serde(with = "humantime_serde")]
    pub backoff: Duration,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    pub max_frame_bytes: usize,
    pub max_datagram_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        let limits = TransportLimits::default();
        Self {
            transport: TransportKind::Tcp,
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            ledger_path: PathBuf::from("ChatAuditLog.dat"),
            log_path: None,
            backoff: Duration::from_millis(2000),
            poll_interval: Duration::from_millis(5000),
            max_frame_bytes: limits.max_frame_bytes,
            max_datagram_bytes: limits.max_datagram_bytes,
        }
    }
}

impl Config {
    /// Load from an optional TOML file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Apply `TRAIL_*` overrides read through `lookup`
    pub fn apply_env(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port.trim().parse().map_err(|e| ConfigError::Env {
                var: ENV_PORT,
                message: format!("{}: {:?}", e, port),
            })?;
        }
        if let Some(transport) = lookup(ENV_TRANSPORT) {
            self.transport = transport
                .parse()
                .map_err(|message| ConfigError::Env {
                    var: ENV_TRANSPORT,
                    message,
                })?;
        }
        if let Some(ledger) = lookup(ENV_LEDGER) {
            self.ledger_path = PathBuf::from(ledger);
        }
        Ok(self)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Advisory lock guarding the ledger against a second daemon
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.ledger_path.clone().into_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    pub fn limits(&self) -> TransportLimits {
        TransportLimits {
            max_frame_bytes: self.max_frame_bytes,
            max_datagram_bytes: self.max_datagram_bytes,
        }
    }

    pub fn coordinator(&self) -> CoordinatorConfig {
        CoordinatorConfig::new(&self.ledger_path)
            .with_backoff(self.backoff)
            .with_poll_interval(self.poll_interval)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
