//! Search form staging
//!
//! Phrase, operator and date edits stay in a draft until the form is
//! submitted. Source selection and paging skip the draft entirely and go
//! straight to the orchestrator.

use crate::model::{qualifying_tokens, CriteriaDelta, DateRange, Operator, SearchCriteria};
use crate::synonyms::SynonymResolver;
use serde::Serialize;

/// Uncommitted form fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormDraft {
    pub phrase: String,
    pub operator: Operator,
    pub date_range: DateRange,
}

/// A single field edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormChange {
    Phrase(String),
    Operator(Operator),
    DateRange(DateRange),
}

#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    draft: FormDraft,
    operator_visible: bool,
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    /// Operator selector visibility for the draft phrase
    pub fn operator_visible(&self) -> bool {
        self.operator_visible
    }

    /// Apply an edit to the draft only
    pub fn edit(&mut self, change: FormChange, committed: &SearchCriteria, resolver: &SynonymResolver) {
        match change {
            FormChange::Phrase(phrase) => self.draft.phrase = phrase,
            FormChange::Operator(operator) => self.draft.operator = operator,
            FormChange::DateRange(date_range) => self.draft.date_range = date_range,
        }
        self.operator_visible = Self::visibility(&self.draft.phrase, committed, resolver);
    }

    /// Recompute operator visibility after the committed state moved
    pub fn refresh(&mut self, committed: &SearchCriteria, resolver: &SynonymResolver) {
        self.operator_visible = Self::visibility(&self.draft.phrase, committed, resolver);
    }

    /// Delta carrying every draft field
    pub fn handle_submit(&self) -> CriteriaDelta {
        CriteriaDelta::new()
            .with_date_range(self.draft.date_range)
            .with_operator(self.draft.operator)
            .with_phrase(self.draft.phrase.clone())
    }

    /// Re-seed the draft from committed criteria
    pub fn sync_from(&mut self, criteria: &SearchCriteria, resolver: &SynonymResolver) {
        self.draft = FormDraft {
            phrase: criteria.phrase.clone(),
            operator: criteria.operator,
            date_range: criteria.date_range,
        };
        self.operator_visible = resolver.is_operator_selector_visible(&criteria.phrase);
    }

    // Expanded synonyms only count while the draft still shows the committed phrase
    fn visibility(draft_phrase: &str, committed: &SearchCriteria, resolver: &SynonymResolver) -> bool {
        if draft_phrase.trim() == committed.phrase {
            resolver.is_operator_selector_visible(draft_phrase)
        } else {
            qualifying_tokens(draft_phrase) >= 2
        }
    }
}
