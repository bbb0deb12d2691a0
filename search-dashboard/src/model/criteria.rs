//! Search criteria: everything that identifies one query

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How multi-word phrases combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    And,
    #[default]
    Or,
}

impl Operator {
    pub const ALL: [Operator; 2] = [Operator::Or, Operator::And];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(Operator::And),
            "OR" => Ok(Operator::Or),
            other => Err(format!("unknown operator '{}'", other)),
        }
    }
}

/// Rows per page. Only the sizes offered by the table are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    #[default]
    Ten,
    Twenty,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [PageSize::Ten, PageSize::Twenty, PageSize::Fifty, PageSize::Hundred];

    pub fn get(self) -> u32 {
        match self {
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or(ValidationError::PageSize(value))
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

/// Zero-based page position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub page_size: PageSize,
}

impl Pagination {
    pub fn new(current_page: u32, page_size: PageSize) -> Self {
        Self {
            current_page,
            page_size,
        }
    }
}

/// Inclusive Unix-timestamp bounds; `None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl DateRange {
    pub fn new(from: Option<i64>, to: Option<i64>) -> Self {
        Self { from, to }
    }
}

/// The selected data source.
///
/// `search_field` and `date_field` stay empty until a query against this
/// source has succeeded and the backend has told us which fields it used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSelection {
    pub id: String,
    pub search_field: Option<String>,
    pub date_field: Option<String>,
}

impl SourceSelection {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            search_field: None,
            date_field: None,
        }
    }
}

/// Last committed search criteria
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub phrase: String,
    pub operator: Operator,
    pub source: Option<SourceSelection>,
    pub date_range: DateRange,
    pub pagination: Pagination,
    pub use_synonyms: bool,
}

impl SearchCriteria {
    pub fn source_id(&self) -> Option<&str> {
        self.source.as_ref().map(|s| s.id.as_str())
    }
}

/// Tokens that count towards the operator rule: longer than two characters
pub fn qualifying_tokens(phrase: &str) -> usize {
    phrase
        .split_whitespace()
        .filter(|token| token.chars().count() > 2)
        .count()
}

/// A partial edit handed to the orchestrator.
///
/// `source` carries only the id; the orchestrator resolves it against the
/// catalog and drops ids it does not know.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaDelta {
    pub date_range: Option<DateRange>,
    pub source: Option<String>,
    pub operator: Option<Operator>,
    pub phrase: Option<String>,
    pub pagination: Option<Pagination>,
}

impl CriteriaDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = Some(date_range);
        self
    }

    pub fn with_source(mut self, id: impl Into<String>) -> Self {
        self.source = Some(id.into());
        self
    }

    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.phrase = Some(phrase.into());
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
