//! Configuration for search-dashboard

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DashboardError, Result};
use crate::model::PageSize;

/// Main dashboard configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Backend connection
    pub backend: BackendConfig,
    /// Search defaults
    #[serde(default)]
    pub search: SearchConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the search API (e.g., "http://localhost:8080/api")
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Search defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Page size used for the first query and after a source change
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directive when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    10
}

fn default_log_level() -> String {
    "search_dashboard=info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| DashboardError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Local development defaults
    pub fn development() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://127.0.0.1:8070".to_string(),
                timeout_seconds: default_timeout(),
            },
            search: SearchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Apply DASHBOARD_BASE_URL and DASHBOARD_LOG overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var("DASHBOARD_BASE_URL") {
            self.backend.base_url = base_url;
        }
        if let Ok(level) = std::env::var("DASHBOARD_LOG") {
            self.logging.level = level;
        }
        self
    }

    /// Configured default page size
    pub fn page_size(&self) -> Result<PageSize> {
        PageSize::try_from(self.search.default_page_size).map_err(DashboardError::from)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.backend.base_url).map_err(|e| {
            DashboardError::Config(format!("Invalid backend URL '{}': {}", self.backend.base_url, e))
        })?;

        if self.backend.timeout_seconds == 0 {
            return Err(DashboardError::Config("timeout_seconds must be positive".to_string()));
        }

        self.page_size()?;

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(DashboardError::Config(format!("Unknown log format '{}'", other))),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::development()
    }
}
