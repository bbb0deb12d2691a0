//! search-dashboard: headless client for a keyword search dashboard
//!
//! Keeps the committed search criteria in sync with an asynchronous search
//! backend: source catalog, token-guarded queries, synonym suggestions and
//! column highlighting. A second screen manages the synonym dictionary.
//!
//! # Features
//!
//! - Source catalog with "last fetch wins" refreshes
//! - Single mutation entry point with stale-response discard
//! - Synonym dictionary lookups and "searched also for" suggestions
//! - Matched/related column highlighting
//! - Dictionary CRUD screen
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8070"
//! timeout_seconds = 30
//!
//! [search]
//! default_page_size = 10
//!
//! [logging]
//! level = "search_dashboard=info"
//! format = "pretty"
//! ```

pub mod backend;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod dictionary_screen;
pub mod error;
pub mod form;
pub mod highlight;
pub mod menu;
pub mod model;
pub mod notification;
pub mod orchestrator;
pub mod results;
pub mod synonyms;

pub use backend::{DictionaryRepository, HttpBackend, SearchBackend};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardCommand, DashboardHandle, DashboardSnapshot};
pub use dictionary_screen::DictionaryScreen;
pub use error::{DashboardError, Result, ValidationError};
pub use orchestrator::{Phase, SearchOrchestrator};
