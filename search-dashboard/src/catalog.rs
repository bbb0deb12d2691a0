//! Source catalog
//!
//! Caches the data sources listed by the backend. Fetches are stamped with a
//! generation so only the most recent one is applied.

use crate::menu::MenuOption;
use crate::model::SourceDescriptor;
use chrono::{DateTime, Datelike, Utc};
use tracing::debug;

/// Identifies one catalog fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchGeneration(u64);

/// Cached source list
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    sources: Vec<SourceDescriptor>,
    generation: u64,
    loaded: bool,
}

impl SourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch; only the newest generation may complete
    pub fn begin_fetch(&mut self) -> FetchGeneration {
        self.generation += 1;
        FetchGeneration(self.generation)
    }

    pub fn is_latest(&self, generation: FetchGeneration) -> bool {
        generation.0 == self.generation
    }

    /// Store fetched sources. Returns `false` for a superseded fetch.
    ///
    /// Duplicate ids keep their first occurrence.
    pub fn complete_fetch(&mut self, generation: FetchGeneration, sources: Vec<SourceDescriptor>) -> bool {
        if !self.is_latest(generation) {
            debug!("Discarding superseded source fetch {:?}", generation);
            return false;
        }

        let mut unique: Vec<SourceDescriptor> = Vec::with_capacity(sources.len());
        for source in sources {
            if !unique.iter().any(|s| s.id == source.id) {
                unique.push(source);
            }
        }

        self.sources = unique;
        self.loaded = true;
        true
    }

    /// Whether a fetch has completed at least once
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn sources(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    pub fn get(&self, id: &str) -> Option<&SourceDescriptor> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Default selection
    pub fn first(&self) -> Option<&SourceDescriptor> {
        self.sources.first()
    }

    /// Options for the source menu
    pub fn options(&self) -> Vec<MenuOption> {
        self.sources
            .iter()
            .map(|s| MenuOption::new(s.label(), s.id.clone()))
            .collect()
    }

    /// "Last updated" caption for a source
    pub fn freshness_label(&self, id: &str) -> String {
        format_timestamp(self.get(id).and_then(|s| s.latest_timestamp))
    }
}

/// Format a Unix timestamp like "March 3rd 2024, 14:05" (UTC), or "N/A"
pub fn format_timestamp(timestamp: Option<i64>) -> String {
    let Some(datetime) = timestamp.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)) else {
        return "N/A".to_string();
    };

    format!(
        "{} {}{} {}",
        datetime.format("%B"),
        datetime.day(),
        ordinal_suffix(datetime.day()),
        datetime.format("%Y, %H:%M")
    )
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
