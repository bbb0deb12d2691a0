//! Backend client abstraction
//!
//! The dashboard never talks to the network directly: it is handed
//! implementations of these traits at construction time.

use crate::error::Result;
use crate::model::{DictionaryEntry, SearchRequest, SearchResult, SourceDescriptor};

pub mod http;
pub mod mock;

pub use http::HttpBackend;
pub use mock::MockBackend;

/// Search backend: source listing, queries and export
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    /// List available data sources
    async fn fetch_sources(&self) -> Result<Vec<SourceDescriptor>>;

    /// Run a query
    async fn search(&self, request: SearchRequest) -> Result<SearchResult>;

    /// Ask the backend to export the query as CSV. Returns the server message.
    async fn export(&self, request: SearchRequest) -> Result<Option<String>>;
}

/// Synonym dictionary storage
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DictionaryRepository: Send + Sync {
    /// All entries
    async fn list(&self) -> Result<Vec<DictionaryEntry>>;

    /// Entry whose keyword matches (case-insensitive), if any
    async fn lookup(&self, keyword: &str) -> Result<Option<DictionaryEntry>>;

    /// Create or replace an entry
    async fn upsert(&self, entry: DictionaryEntry) -> Result<()>;

    /// Delete an entry by keyword
    async fn remove(&self, keyword: &str) -> Result<()>;
}
