//! Result view state surfaced to the table

use crate::highlight::{derive_column_styles, StyledColumn};
use crate::model::{PageInfo, Row, SearchResult};
use serde::Serialize;

/// What the table renders
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultViewState {
    pub rows: Vec<Row>,
    pub columns: Vec<StyledColumn>,
    pub pagination: PageInfo,
    pub matched_field: Option<String>,
}

impl ResultViewState {
    /// Build the view from a fresh result. `phrase` is the committed phrase.
    pub fn from_result(result: &SearchResult, phrase: &str) -> Self {
        let matched_field = result
            .resolved_source
            .as_ref()
            .map(|s| s.search_field.clone())
            .filter(|f| !f.is_empty())
            .or_else(|| result.matched_field.clone());

        Self {
            rows: result.rows.clone(),
            columns: derive_column_styles(&result.columns, phrase, matched_field.as_deref()),
            pagination: result.pagination,
            matched_field,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a next page exists
    pub fn has_next_page(&self) -> bool {
        self.pagination.current_page + 1 < self.pagination.total_pages
    }
}
