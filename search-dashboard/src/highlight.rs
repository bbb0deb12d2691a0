//! Column highlight derivation
//!
//! The column the phrase matched is styled "matched"; the column right after
//! it (its context column) is styled "related".

use crate::model::Column;
use serde::Serialize;

/// Hue of the matched column
pub const MATCHED_COLOR: &str = "#9a0007";
/// Hue of the column following the matched one
pub const RELATED_COLOR: &str = "#00600f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    #[default]
    Plain,
    Matched,
    Related,
}

impl Emphasis {
    pub fn color(&self) -> Option<&'static str> {
        match self {
            Emphasis::Plain => None,
            Emphasis::Matched => Some(MATCHED_COLOR),
            Emphasis::Related => Some(RELATED_COLOR),
        }
    }

    pub fn is_bold(&self) -> bool {
        !matches!(self, Emphasis::Plain)
    }
}

/// A column with its display emphasis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledColumn {
    #[serde(flatten)]
    pub column: Column,
    pub emphasis: Emphasis,
}

/// Style `columns` for a query on `phrase` that matched `matched_field`.
///
/// Nothing is emphasised for an empty phrase, an empty or unknown field.
/// A match on the last column marks only that column.
pub fn derive_column_styles(columns: &[Column], phrase: &str, matched_field: Option<&str>) -> Vec<StyledColumn> {
    let matched_index = matched_field
        .filter(|field| !field.is_empty() && !phrase.trim().is_empty())
        .and_then(|field| columns.iter().position(|c| c.field == field));

    columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let emphasis = match matched_index {
                Some(m) if idx == m => Emphasis::Matched,
                Some(m) if idx == m + 1 => Emphasis::Related,
                _ => Emphasis::Plain,
            };
            StyledColumn {
                column: column.clone(),
                emphasis,
            }
        })
        .collect()
}
