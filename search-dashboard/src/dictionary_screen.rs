//! Dictionary management screen
//!
//! Lists synonym dictionary entries with a client-side filter and an edit
//! dialog. Mutations are not optimistic: each one is followed by a full
//! refetch.

use crate::backend::DictionaryRepository;
use crate::error::{Result, ValidationError};
use crate::model::DictionaryEntry;
use crate::notification::Notification;
use serde::Serialize;
use tracing::{info, warn};

/// What the dialog was opened for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogAction {
    Create,
    Update,
}

impl DialogAction {
    fn past_tense(&self) -> &'static str {
        match self {
            DialogAction::Create => "created",
            DialogAction::Update => "updated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogState {
    pub open: bool,
    pub action: DialogAction,
    pub entry: Option<DictionaryEntry>,
}

pub struct DictionaryScreen<R: DictionaryRepository> {
    repository: R,
    entries: Vec<DictionaryEntry>,
    filter: String,
    dialog: DialogState,
    notification: Option<Notification>,
}

impl<R: DictionaryRepository> DictionaryScreen<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            entries: Vec::new(),
            filter: String::new(),
            dialog: DialogState {
                open: false,
                action: DialogAction::Create,
                entry: None,
            },
            notification: None,
        }
    }

    /// Reload every entry. Failure keeps the previous list.
    pub async fn refresh(&mut self) {
        match self.repository.list().await {
            Ok(entries) => {
                info!("Loaded {} dictionary entries", entries.len());
                self.entries = entries;
            }
            Err(e) => {
                warn!("Failed to list dictionary: {}", e);
                self.notification = Some(Notification::error("Unable to fetch"));
            }
        }
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    /// Entries matching the current filter
    pub fn visible_entries(&self) -> Vec<&DictionaryEntry> {
        let query = self.filter.to_lowercase();
        if query.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries.iter().filter(|e| e.matches(&query)).collect()
    }

    /// Set the filter query. A single character is trimmed so a lone space
    /// does not filter.
    pub fn set_filter(&mut self, query: &str) {
        self.filter = if query.chars().count() > 1 {
            query.to_string()
        } else {
            query.trim().to_string()
        };
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn dialog(&self) -> &DialogState {
        &self.dialog
    }

    pub fn open_dialog(&mut self, action: DialogAction, entry: Option<DictionaryEntry>) {
        self.dialog = DialogState {
            open: true,
            action,
            entry,
        };
    }

    pub fn toggle_dialog(&mut self) {
        self.dialog.open = !self.dialog.open;
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Create or update an entry.
    ///
    /// Validation failures are returned inline and nothing is sent. Backend
    /// failures become a notification; the list is refetched either way.
    pub async fn save(&mut self, entry: DictionaryEntry) -> Result<()> {
        if entry.keyword.is_empty() {
            return Err(ValidationError::MissingKeyword.into());
        }
        if entry.synonyms.is_empty() {
            return Err(ValidationError::MissingSynonym.into());
        }

        let status = self.dialog.action.past_tense();
        match self.repository.upsert(entry.clone()).await {
            Ok(()) => {
                info!("Dictionary entry '{}' {}", entry.keyword, status);
                self.notification = Some(Notification::success(format!("Resource {}", status)));
                // Delete becomes available once the entry exists
                self.dialog.action = DialogAction::Update;
                self.dialog.entry = Some(entry);
            }
            Err(e) => {
                warn!("Failed to save dictionary entry '{}': {}", entry.keyword, e);
                self.notification = Some(Notification::error(format!("Resource could not be {}", status)));
            }
        }

        self.refresh().await;
        Ok(())
    }

    /// Delete an entry, close the dialog and refetch
    pub async fn delete(&mut self, keyword: &str) {
        match self.repository.remove(keyword).await {
            Ok(()) => {
                info!("Dictionary entry '{}' deleted", keyword);
                self.notification = Some(Notification::success("Resource deleted"));
            }
            Err(e) => {
                warn!("Failed to delete dictionary entry '{}': {}", keyword, e);
                self.notification = Some(Notification::error("Resource could not be deleted"));
            }
        }

        self.dialog.open = false;
        self.refresh().await;
    }
}
