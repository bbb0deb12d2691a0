//! Query results as the table sees them

use super::dictionary::DictionaryEntry;
use super::source::SourceDescriptor;
use serde::{Deserialize, Serialize};

/// One result record, field name to value
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Column value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Numeric,
    Date,
    Boolean,
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub field: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(field: impl Into<String>, title: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            field: field.into(),
            title: title.into(),
            column_type,
        }
    }
}

/// Pagination totals reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub page_size: u32,
    pub total_hits: u64,
    pub total_pages: u32,
}

/// Outcome of one successful query. Replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResult {
    pub rows: Vec<Row>,
    pub columns: Vec<Column>,
    pub pagination: PageInfo,
    /// Field the phrase matched against, if any
    pub matched_field: Option<String>,
    pub resolved_source: Option<SourceDescriptor>,
    pub dictionary_hit: Option<DictionaryEntry>,
}
