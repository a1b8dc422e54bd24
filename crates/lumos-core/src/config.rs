//! Configuration for the debug server.
//!
//! Loaded from a TOML file with a `[debug]` table; every field has a
//! default so a missing file or empty table yields a working config:
//!
//! ```toml
//! [debug]
//! port = 8081
//! max_request_bytes = 65536
//! io_timeout_secs = 10
//! shutdown_grace_secs = 5
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::protocol::DEFAULT_DEBUG_PORT;

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Debug server configuration.
    #[serde(default)]
    pub debug: DebugConfig,
}

/// Debug server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// TCP port for the debug protocol. The listener always binds loopback.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Requests larger than this are rejected with an error response.
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
    /// Socket read/write timeout; a stalled client is dropped after this.
    #[serde(default = "default_io_timeout_secs")]
    pub io_timeout_secs: u64,
    /// How long in-flight connections get to finish during shutdown.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            max_request_bytes: default_max_request_bytes(),
            io_timeout_secs: default_io_timeout_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

impl DebugConfig {
    pub fn io_timeout(&self) -> Duration {
        Duration::from_secs(self.io_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

fn default_port() -> u16 {
    DEFAULT_DEBUG_PORT
}

fn default_max_request_bytes() -> usize {
    64 * 1024
}

fn default_io_timeout_secs() -> u64 {
    10
}

fn default_shutdown_grace_secs() -> u64 {
    5
}

/// Command-line values layered over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit config file path; `None` uses built-in defaults.
    pub config_path: Option<PathBuf>,
    /// Debug port override.
    pub port: Option<u16>,
}

/// Load the config file (when given) and apply overrides on top.
pub fn resolve_config(overrides: &ConfigOverrides) -> anyhow::Result<Config> {
    let mut config = match &overrides.config_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(port) = overrides.port {
        config.debug.port = port;
    }

    Ok(config)
}
