//! Synonym resolver
//!
//! Holds at most one dictionary entry: the one matching the primary token of
//! the current phrase. Lookups are token-guarded so a result for a phrase the
//! user has since edited never lands.

use crate::error::{Result, ValidationError};
use crate::model::{qualifying_tokens, DictionaryEntry};
use tracing::debug;

/// Identifies one dictionary lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LookupToken(u64);

/// A lookup the caller owes the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLookup {
    pub token: LookupToken,
    /// Normalized primary token to look up
    pub keyword: String,
}

/// First whitespace-separated token, lower-cased
pub fn primary_token(phrase: &str) -> Option<String> {
    phrase.split_whitespace().next().map(str::to_lowercase)
}

#[derive(Debug, Clone, Default)]
pub struct SynonymResolver {
    current_entry: Option<DictionaryEntry>,
    expansion_requested: bool,
    /// Primary token the held entry (or the outstanding lookup) belongs to
    anchor: Option<String>,
    lookup_token: u64,
}

impl SynonymResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_entry(&self) -> Option<&DictionaryEntry> {
        self.current_entry.as_ref()
    }

    pub fn expansion_requested(&self) -> bool {
        self.expansion_requested
    }

    /// Token of the most recent lookup generation
    pub fn current_token(&self) -> LookupToken {
        LookupToken(self.lookup_token)
    }

    /// React to a phrase edit. Returns `true` when the held entry was
    /// invalidated and a fresh lookup is owed.
    pub fn on_phrase_changed(&mut self, new_phrase: &str, previous_phrase: &str) -> bool {
        let new_key = primary_token(new_phrase);
        let reference = self.anchor.clone().or_else(|| primary_token(previous_phrase));

        // Without an anchor nothing was ever looked up, so a lookup is owed
        if self.anchor.is_some() && new_key == reference {
            return false;
        }

        debug!("Phrase token changed {:?} -> {:?}, dropping dictionary entry", reference, new_key);
        self.current_entry = None;
        self.expansion_requested = false;
        self.anchor = new_key;
        self.lookup_token += 1;
        true
    }

    /// Describe the lookup owed for the current anchor, if any
    pub fn pending_lookup(&self) -> Option<PendingLookup> {
        self.anchor.as_ref().map(|keyword| PendingLookup {
            token: self.current_token(),
            keyword: keyword.clone(),
        })
    }

    /// Apply a lookup result. Ignored (returns `false`) when the phrase has
    /// changed since `token` was handed out.
    pub fn on_dictionary_lookup_result(&mut self, token: LookupToken, entry: Option<DictionaryEntry>) -> bool {
        if token.0 != self.lookup_token {
            debug!("Discarding stale dictionary lookup {:?} (latest {})", token, self.lookup_token);
            return false;
        }

        self.current_entry = entry;
        true
    }

    /// Flip the expansion flag. Only meaningful while an entry is held.
    pub fn toggle_expansion(&mut self) -> Result<bool> {
        if self.current_entry.is_none() {
            return Err(ValidationError::NoDictionaryEntry.into());
        }
        self.expansion_requested = !self.expansion_requested;
        Ok(self.expansion_requested)
    }

    /// More than one search term, literal or synonym-expanded
    pub fn is_operator_selector_visible(&self, phrase: &str) -> bool {
        qualifying_tokens(phrase) >= 2 || (self.current_entry.is_some() && self.expansion_requested)
    }

    /// "Searched also for" suggestions
    pub fn suggestions(&self) -> &[String] {
        self.current_entry
            .as_ref()
            .map(|e| e.synonyms.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_suggestion_visible(&self) -> bool {
        !self.suggestions().is_empty()
    }

    /// Forget everything, invalidating outstanding lookups
    pub fn clear(&mut self) {
        self.current_entry = None;
        self.expansion_requested = false;
        self.anchor = None;
        self.lookup_token += 1;
    }
}
