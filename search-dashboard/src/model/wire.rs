//! Backend wire format
//!
//! Request and response bodies exchanged with the search backend. Field
//! names follow the backend, not Rust conventions.

use super::criteria::{Operator, Pagination, SearchCriteria};
use super::dictionary::DictionaryEntry;
use super::result::{Column, PageInfo, Row, SearchResult};
use super::source::SourceDescriptor;
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};

/// Phrase clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchClause {
    pub phrase: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub operator: Operator,
}

/// Date clause. Unbounded ends are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateClause {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<i64>,
}

/// Search (and export) request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub search: SearchClause,
    pub date: DateClause,
    pub pagination: Pagination,
    pub source: String,
    #[serde(rename = "useSynonyms")]
    pub use_synonyms: bool,
}

impl SearchRequest {
    /// Build the request for the given criteria. `None` while no source is selected.
    pub fn from_criteria(criteria: &SearchCriteria) -> Option<Self> {
        let source = criteria.source.as_ref()?;

        Some(Self {
            search: SearchClause {
                phrase: criteria.phrase.trim().to_string(),
                field: source.search_field.clone(),
                operator: criteria.operator,
            },
            date: DateClause {
                field: source.date_field.clone(),
                from: criteria.date_range.from,
                to: criteria.date_range.to,
            },
            pagination: criteria.pagination,
            source: source.id.clone(),
            use_synonyms: criteria.use_synonyms,
        })
    }
}

/// Envelope used by every backend endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Unwrap the payload, turning `success: false` into a rejection
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(DashboardError::rejected(self.message));
        }
        self.data
            .ok_or_else(|| DashboardError::Rejected("Response carried no data".to_string()))
    }

    /// For endpoints that only acknowledge. Returns the server message, if any.
    pub fn into_ack(self) -> Result<Option<String>> {
        if self.success {
            Ok(self.message)
        } else {
            Err(DashboardError::rejected(self.message))
        }
    }
}

impl ApiResponse<()> {
    pub fn acknowledged(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Backend pagination block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawPagination {
    pub current_page: u32,
    pub step: u32,
    pub total_hits: u64,
    pub total_pages: u32,
}

impl From<RawPagination> for PageInfo {
    fn from(raw: RawPagination) -> Self {
        Self {
            current_page: raw.current_page,
            page_size: raw.step,
            total_hits: raw.total_hits,
            total_pages: raw.total_pages,
        }
    }
}

/// `data` of a search response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPayload {
    #[serde(default)]
    pub results: Vec<Row>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub pagination: RawPagination,
    #[serde(default)]
    pub dictionary: Option<DictionaryEntry>,
    #[serde(default)]
    pub source: Option<SourceDescriptor>,
}

impl From<SearchPayload> for SearchResult {
    fn from(payload: SearchPayload) -> Self {
        let matched_field = payload
            .source
            .as_ref()
            .map(|s| s.search_field.clone())
            .filter(|f| !f.is_empty());

        Self {
            rows: payload.results,
            columns: payload.columns,
            pagination: payload.pagination.into(),
            matched_field,
            resolved_source: payload.source,
            dictionary_hit: payload.dictionary,
        }
    }
}
