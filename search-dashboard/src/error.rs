//! Error types for search-dashboard

use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Dashboard error types
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Network or transport failure talking to the backend
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Backend answered with `success: false`
    #[error("{0}")]
    Rejected(String),

    /// Locally detected invalid input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The dashboard task has stopped
    #[error("Dashboard is shut down")]
    Closed,
}

impl DashboardError {
    /// Build a server rejection, falling back to a generic message when the
    /// backend did not send one.
    pub fn rejected(message: Option<String>) -> Self {
        Self::Rejected(message.unwrap_or_else(|| "Request rejected by server".to_string()))
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        Self::Fetch(err.to_string())
    }
}

/// Inline form errors. These never reach the orchestrator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Keyword is required")]
    MissingKeyword,

    #[error("At least one synonym is required")]
    MissingSynonym,

    #[error("No dictionary entry to expand with")]
    NoDictionaryEntry,

    #[error("Unsupported page size: {0}")]
    PageSize(u32),
}
