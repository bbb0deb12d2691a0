//! Data source descriptors

use serde::{Deserialize, Serialize};

/// One searchable data source as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Backend index name
    #[serde(rename = "index")]
    pub id: String,
    /// Human-readable name (may be empty)
    #[serde(rename = "indexAlias", default)]
    pub display_name: String,
    /// Field the phrase is matched against
    #[serde(rename = "searchField", default)]
    pub search_field: String,
    /// Field the date range filters on
    #[serde(rename = "dateField", default)]
    pub date_field: String,
    /// Unix timestamp of the newest document
    #[serde(rename = "timestamp", default)]
    pub latest_timestamp: Option<i64>,
}

impl SourceDescriptor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            search_field: String::new(),
            date_field: String::new(),
            latest_timestamp: None,
        }
    }

    pub fn with_fields(mut self, search_field: impl Into<String>, date_field: impl Into<String>) -> Self {
        self.search_field = search_field.into();
        self.date_field = date_field.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.latest_timestamp = Some(timestamp);
        self
    }

    /// Label for menus: the alias, or the id when no alias is configured
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }
}
