//! Configuration for stub-backend

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{Result, StubError};

/// Stub backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StubConfig {
    /// Address to listen on (e.g., "127.0.0.1:8070")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8070".to_string()
}

fn default_log_level() -> String {
    "stub_backend=info,tower_http=info".to_string()
}

impl StubConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StubError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content).map_err(|e| StubError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply STUB_LISTEN_ADDR override
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(addr) = std::env::var("STUB_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        self
    }

    /// Parsed listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .parse()
            .map_err(|e| StubError::Config(format!("Invalid listen address '{}': {}", self.listen_addr, e)))
    }
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            log_level: default_log_level(),
        }
    }
}
