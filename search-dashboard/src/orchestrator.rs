//! Search orchestrator
//!
//! Owns the committed [`SearchCriteria`] and the [`ResultViewState`], decides
//! when an edit warrants a query and merges backend answers back in.
//!
//! The orchestrator performs no I/O. Mutations return the work they require
//! ([`PendingQuery`], [`PendingLookup`], [`FetchGeneration`]); the caller runs
//! it and hands the completion back through the `merge_*` methods together
//! with the token it was issued with. Completions carrying a superseded token,
//! or arriving after [`SearchOrchestrator::dispose`], are dropped.

use crate::catalog::{format_timestamp, FetchGeneration, SourceCatalog};
use crate::error::Result;
use crate::model::{
    CriteriaDelta, DictionaryEntry, PageSize, Pagination, SearchCriteria, SearchRequest, SearchResult,
    SourceDescriptor, SourceSelection,
};
use crate::notification::Notification;
use crate::results::ResultViewState;
use crate::synonyms::{LookupToken, PendingLookup, SynonymResolver};
use tracing::{debug, info, warn};

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Phase {
    /// Not mounted yet
    Idle,
    /// Waiting for the first source listing
    AwaitingSources,
    /// Sources known, no query outstanding
    Ready,
    /// Latest query outstanding
    Querying,
    /// Source listing failed or came back empty; querying disabled
    QueryFailed,
}

/// Identifies one issued query
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryToken(u64);

/// A query the caller must run and merge back with its token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub token: QueryToken,
    pub request: SearchRequest,
}

/// Work owed after a mutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeOutcome {
    pub query: Option<PendingQuery>,
    pub lookup: Option<PendingLookup>,
}

#[derive(Debug, Clone)]
pub struct SearchOrchestrator {
    criteria: SearchCriteria,
    catalog: SourceCatalog,
    resolver: SynonymResolver,
    view: ResultViewState,
    phase: Phase,
    notification: Option<Notification>,
    latest_query: u64,
    /// Lookup generation current when the latest query was issued
    query_lookup_token: LookupToken,
    last_timestamp: Option<i64>,
    default_page_size: PageSize,
    disposed: bool,
}

impl SearchOrchestrator {
    pub fn new() -> Self {
        Self::with_page_size(PageSize::default())
    }

    /// Orchestrator whose fresh and reset paginations use `page_size`
    pub fn with_page_size(page_size: PageSize) -> Self {
        let resolver = SynonymResolver::new();
        let query_lookup_token = resolver.current_token();
        Self {
            criteria: SearchCriteria {
                pagination: Pagination::new(0, page_size),
                ..SearchCriteria::default()
            },
            catalog: SourceCatalog::new(),
            resolver,
            view: ResultViewState::default(),
            phase: Phase::Idle,
            notification: None,
            latest_query: 0,
            query_lookup_token,
            last_timestamp: None,
            default_page_size: page_size,
            disposed: false,
        }
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn view(&self) -> &ResultViewState {
        &self.view
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn catalog(&self) -> &SourceCatalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &SynonymResolver {
        &self.resolver
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// A source is selected and the orchestrator is live
    pub fn is_querying_enabled(&self) -> bool {
        !self.disposed && self.criteria.source.is_some()
    }

    /// Operator selector visibility for the committed phrase
    pub fn operator_selector_visible(&self) -> bool {
        self.resolver.is_operator_selector_visible(&self.criteria.phrase)
    }

    /// "Last updated" caption of the selected source
    pub fn freshness_label(&self) -> String {
        format_timestamp(self.last_timestamp)
    }

    /// Start: `Idle -> AwaitingSources`. Returns the catalog fetch to run.
    pub fn mount(&mut self) -> Option<FetchGeneration> {
        if self.phase != Phase::Idle || self.disposed {
            return None;
        }
        self.phase = Phase::AwaitingSources;
        Some(self.catalog.begin_fetch())
    }

    /// Source menu reopened: refresh the catalog
    pub fn reopen_sources(&mut self) -> FetchGeneration {
        self.catalog.begin_fetch()
    }

    /// Merge a catalog fetch
    pub fn merge_sources(
        &mut self,
        generation: FetchGeneration,
        result: Result<Vec<SourceDescriptor>>,
    ) -> ChangeOutcome {
        if self.disposed || !self.catalog.is_latest(generation) {
            debug!("Ignoring source listing {:?}", generation);
            return ChangeOutcome::default();
        }

        let sources = match result {
            Ok(sources) => sources,
            Err(e) => {
                warn!("Failed to fetch sources: {}", e);
                if self.criteria.source.is_none() {
                    self.phase = Phase::QueryFailed;
                }
                self.notification = Some(Notification::error(e.to_string()));
                return ChangeOutcome::default();
            }
        };

        self.catalog.complete_fetch(generation, sources);
        info!("Source catalog loaded with {} sources", self.catalog.sources().len());

        let still_selected = self
            .criteria
            .source_id()
            .map(|id| self.catalog.get(id).is_some())
            .unwrap_or(false);
        if still_selected {
            return ChangeOutcome::default();
        }

        match self.catalog.first().cloned() {
            Some(first) => {
                // Source becomes known: select it and query
                self.select_source(&first);
                if self.phase == Phase::AwaitingSources || self.phase == Phase::QueryFailed {
                    self.phase = Phase::Ready;
                }
                ChangeOutcome {
                    query: self.issue_query(),
                    lookup: None,
                }
            }
            None => {
                warn!("No data sources available, querying disabled");
                self.criteria.source = None;
                self.phase = Phase::QueryFailed;
                self.notification = Some(Notification::error("No data sources available"));
                ChangeOutcome::default()
            }
        }
    }

    fn select_source(&mut self, source: &SourceDescriptor) {
        self.criteria.source = Some(SourceSelection::new(source.id.clone()));
        self.criteria.pagination = Pagination::new(0, self.default_page_size);
        self.last_timestamp = source.latest_timestamp;
    }

    /// Apply an edit.
    ///
    /// Precedence: date range, source, operator, phrase, pagination. Every
    /// accepted delta issues a query once a source is selected; a delta whose
    /// only content is an unknown source is dropped.
    pub fn apply_change(&mut self, delta: CriteriaDelta) -> ChangeOutcome {
        if self.disposed {
            return ChangeOutcome::default();
        }

        // An empty delta is a plain resubmission
        let mut accepted = delta.is_empty();
        let mut outcome = ChangeOutcome::default();

        if let Some(date_range) = delta.date_range {
            self.criteria.date_range = date_range;
            accepted = true;
        }

        if let Some(id) = delta.source {
            match self.catalog.get(&id).cloned() {
                Some(source) => {
                    debug!("Source changed to {}", source.id);
                    self.select_source(&source);
                    accepted = true;
                }
                None => warn!("Ignoring selection of unknown source '{}'", id),
            }
        }

        if let Some(operator) = delta.operator {
            self.criteria.operator = operator;
            accepted = true;
        }

        if let Some(phrase) = delta.phrase {
            let phrase = phrase.trim().to_string();
            if phrase != self.criteria.phrase {
                let previous = std::mem::replace(&mut self.criteria.phrase, phrase);
                if self.resolver.on_phrase_changed(&self.criteria.phrase, &previous) {
                    outcome.lookup = self.resolver.pending_lookup();
                }
                self.criteria.use_synonyms = true;
            }
            accepted = true;
        }

        if let Some(pagination) = delta.pagination {
            self.criteria.pagination = pagination;
            accepted = true;
        }

        if accepted {
            outcome.query = self.issue_query();
        }
        outcome
    }

    /// Flip synonym expansion and requery. Fails without a dictionary entry.
    pub fn toggle_synonyms(&mut self) -> Result<ChangeOutcome> {
        if self.disposed {
            return Ok(ChangeOutcome::default());
        }
        let requested = self.resolver.toggle_expansion()?;
        self.criteria.use_synonyms = requested;
        Ok(ChangeOutcome {
            query: self.issue_query(),
            lookup: None,
        })
    }

    /// Back to default criteria on the selected source
    pub fn reset(&mut self) -> ChangeOutcome {
        if self.disposed {
            return ChangeOutcome::default();
        }

        let source = self.criteria.source.take();
        self.criteria = SearchCriteria {
            source,
            pagination: Pagination::new(0, self.default_page_size),
            ..SearchCriteria::default()
        };
        self.resolver.clear();

        ChangeOutcome {
            query: self.issue_query(),
            lookup: None,
        }
    }

    fn issue_query(&mut self) -> Option<PendingQuery> {
        if self.disposed {
            return None;
        }
        let request = SearchRequest::from_criteria(&self.criteria)?;

        self.latest_query += 1;
        self.query_lookup_token = self.resolver.current_token();
        self.phase = Phase::Querying;

        info!(
            "Issuing query #{} source={} page={} phrase={:?}",
            self.latest_query, request.source, request.pagination.current_page, request.search.phrase
        );

        Some(PendingQuery {
            token: QueryToken(self.latest_query),
            request,
        })
    }

    /// Merge a query completion. Returns whether it was applied.
    pub fn merge_query(&mut self, token: QueryToken, result: Result<SearchResult>) -> bool {
        if self.disposed {
            debug!("Dropping query #{} after dispose", token.0);
            return false;
        }
        if token.0 != self.latest_query {
            debug!("Discarding stale query #{} (latest #{})", token.0, self.latest_query);
            return false;
        }

        self.phase = Phase::Ready;

        match result {
            Ok(result) => {
                if let Some(resolved) = &result.resolved_source {
                    if let Some(selection) = self.criteria.source.as_mut() {
                        selection.search_field = Some(resolved.search_field.clone()).filter(|f| !f.is_empty());
                        selection.date_field = Some(resolved.date_field.clone()).filter(|f| !f.is_empty());
                    }
                    if resolved.latest_timestamp.is_some() {
                        self.last_timestamp = resolved.latest_timestamp;
                    }
                }

                // A hit confirms the entry; no hit leaves a looked-up entry alone
                if let Some(entry) = result.dictionary_hit.clone() {
                    self.resolver
                        .on_dictionary_lookup_result(self.query_lookup_token, Some(entry));
                }
                self.view = ResultViewState::from_result(&result, &self.criteria.phrase);

                debug!(
                    "Merged query #{}: {} rows, {} hits",
                    token.0,
                    self.view.rows.len(),
                    self.view.pagination.total_hits
                );
            }
            Err(e) => {
                warn!("Query #{} failed: {}", token.0, e);
                self.notification = Some(Notification::error(e.to_string()));
            }
        }
        true
    }

    /// Merge a dictionary lookup. Failures are logged, not surfaced.
    pub fn merge_lookup(&mut self, token: LookupToken, result: Result<Option<DictionaryEntry>>) -> bool {
        if self.disposed {
            return false;
        }
        match result {
            Ok(entry) => self.resolver.on_dictionary_lookup_result(token, entry),
            Err(e) => {
                warn!("Dictionary lookup failed: {}", e);
                false
            }
        }
    }

    /// Export request for the committed criteria
    pub fn export_request(&self) -> Option<SearchRequest> {
        if self.disposed {
            return None;
        }
        SearchRequest::from_criteria(&self.criteria)
    }

    pub fn merge_export(&mut self, result: Result<Option<String>>) {
        if self.disposed {
            return;
        }
        self.notification = Some(match result {
            Ok(message) => Notification::success(message.unwrap_or_else(|| "Data successfully exported".to_string())),
            Err(e) => {
                warn!("Export failed: {}", e);
                Notification::error(e.to_string())
            }
        });
    }

    /// Teardown: nothing merges after this
    pub fn dispose(&mut self) {
        self.disposed = true;
    }
}

impl Default for SearchOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::highlight::Emphasis;
    use crate::model::{Column, ColumnType, DateRange, Operator, PageInfo, Row};
    use crate::notification::NotificationKind;

    fn sources() -> Vec<SourceDescriptor> {
        vec![
            SourceDescriptor::new("pets", "Pets").with_timestamp(1_709_474_700),
            SourceDescriptor::new("orders", "Orders"),
        ]
    }

    /// Mounted orchestrator with the catalog loaded and its first query issued
    fn ready() -> (SearchOrchestrator, PendingQuery) {
        let mut orch = SearchOrchestrator::new();
        let generation = orch.mount().unwrap();
        let outcome = orch.merge_sources(generation, Ok(sources()));
        let query = outcome.query.expect("first source triggers a query");
        (orch, query)
    }

    fn result_with(names: &[&str]) -> SearchResult {
        let rows = names
            .iter()
            .map(|name| {
                let mut row = Row::new();
                row.insert("name".to_string(), serde_json::json!(name));
                row
            })
            .collect();

        SearchResult {
            rows,
            columns: vec![
                Column::new("name", "Name", ColumnType::String),
                Column::new("note", "Note", ColumnType::String),
            ],
            pagination: PageInfo {
                current_page: 0,
                page_size: 10,
                total_hits: names.len() as u64,
                total_pages: 1,
            },
            matched_field: Some("name".to_string()),
            resolved_source: Some(SourceDescriptor::new("pets", "").with_fields("name", "born")),
            dictionary_hit: None,
        }
    }

    fn names(view: &ResultViewState) -> Vec<String> {
        view.rows
            .iter()
            .map(|r| r["name"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_mount_selects_first_source() {
        let (orch, query) = ready();
        assert_eq!(orch.phase(), Phase::Querying);
        assert_eq!(orch.criteria().source_id(), Some("pets"));
        assert_eq!(query.request.source, "pets");
        assert_eq!(query.request.pagination, Pagination::default());
        assert!(orch.criteria().source.as_ref().unwrap().search_field.is_none());
    }

    #[test]
    fn test_mount_only_once() {
        let (mut orch, _) = ready();
        assert!(orch.mount().is_none());
    }

    #[test]
    fn test_empty_catalog_disables_querying() {
        let mut orch = SearchOrchestrator::new();
        let generation = orch.mount().unwrap();
        let outcome = orch.merge_sources(generation, Ok(Vec::new()));

        assert!(outcome.query.is_none());
        assert_eq!(orch.phase(), Phase::QueryFailed);
        assert!(!orch.is_querying_enabled());
        assert!(orch.notification().unwrap().is_error());

        // Edits are kept locally but nothing is queried
        let outcome = orch.apply_change(CriteriaDelta::new().with_phrase("cat"));
        assert!(outcome.query.is_none());
    }

    #[test]
    fn test_source_fetch_failure() {
        let mut orch = SearchOrchestrator::new();
        let generation = orch.mount().unwrap();
        orch.merge_sources(generation, Err(DashboardError::Fetch("connection refused".to_string())));

        assert_eq!(orch.phase(), Phase::QueryFailed);
        assert_eq!(orch.notification().unwrap().kind, NotificationKind::Error);
    }

    #[test]
    fn test_reopen_after_failure_recovers() {
        let mut orch = SearchOrchestrator::new();
        let generation = orch.mount().unwrap();
        orch.merge_sources(generation, Err(DashboardError::Fetch("down".to_string())));

        let generation = orch.reopen_sources();
        let outcome = orch.merge_sources(generation, Ok(sources()));
        assert!(outcome.query.is_some());
        assert_eq!(orch.criteria().source_id(), Some("pets"));
    }

    #[test]
    fn test_reopen_keeps_selection() {
        let (mut orch, _) = ready();
        orch.apply_change(CriteriaDelta::new().with_source("orders"));

        let generation = orch.reopen_sources();
        let outcome = orch.merge_sources(generation, Ok(sources()));
        assert!(outcome.query.is_none());
        assert_eq!(orch.criteria().source_id(), Some("orders"));
    }

    #[test]
    fn test_query_merge_fills_source_fields() {
        let (mut orch, query) = ready();
        assert!(orch.merge_query(query.token, Ok(result_with(&["r1"]))));

        let selection = orch.criteria().source.as_ref().unwrap();
        assert_eq!(selection.search_field.as_deref(), Some("name"));
        assert_eq!(selection.date_field.as_deref(), Some("born"));
        assert_eq!(orch.phase(), Phase::Ready);
        assert_eq!(orch.freshness_label(), "March 3rd 2024, 14:05");
    }

    #[test]
    fn test_identical_submit_is_idempotent() {
        let (mut orch, first) = ready();
        orch.merge_query(first.token, Ok(result_with(&["r0"])));

        let delta = CriteriaDelta::new().with_phrase("cat");
        let a = orch.apply_change(delta.clone()).query.unwrap();
        orch.merge_query(a.token, Ok(result_with(&["r1", "r2"])));
        let after_first = orch.view().clone();

        let b = orch.apply_change(delta).query.unwrap();
        assert_ne!(a.token, b.token);
        assert_eq!(a.request, b.request);
        orch.merge_query(b.token, Ok(result_with(&["r1", "r2"])));

        assert_eq!(orch.view(), &after_first);
    }

    #[test]
    fn test_stale_response_discarded() {
        let (mut orch, _) = ready();
        let a = orch.apply_change(CriteriaDelta::new().with_phrase("alpha")).query.unwrap();
        let b = orch.apply_change(CriteriaDelta::new().with_phrase("beta")).query.unwrap();

        assert!(orch.merge_query(b.token, Ok(result_with(&["b1"]))));
        assert!(!orch.merge_query(a.token, Ok(result_with(&["a1"]))));

        assert_eq!(names(orch.view()), vec!["b1"]);
        assert_eq!(orch.phase(), Phase::Ready);
    }

    #[test]
    fn test_stale_failure_is_silent() {
        let (mut orch, _) = ready();
        let a = orch.apply_change(CriteriaDelta::new().with_phrase("alpha")).query.unwrap();
        let b = orch.apply_change(CriteriaDelta::new().with_phrase("beta")).query.unwrap();

        orch.merge_query(a.token, Err(DashboardError::Fetch("timeout".to_string())));
        assert!(orch.notification().is_none());
        assert_eq!(orch.phase(), Phase::Querying);

        orch.merge_query(b.token, Ok(result_with(&["b1"])));
        assert!(orch.notification().is_none());
    }

    #[test]
    fn test_source_change_resets_pagination() {
        let (mut orch, _) = ready();
        let paged = orch
            .apply_change(CriteriaDelta::new().with_pagination(Pagination::new(3, PageSize::Twenty)))
            .query
            .unwrap();
        assert_eq!(paged.request.pagination.current_page, 3);

        let next = orch.apply_change(CriteriaDelta::new().with_source("orders")).query.unwrap();
        assert_eq!(next.request.pagination, Pagination::new(0, PageSize::Ten));
        assert_eq!(next.request.source, "orders");
    }

    #[test]
    fn test_unknown_source_ignored() {
        let (mut orch, _) = ready();
        orch.apply_change(CriteriaDelta::new().with_pagination(Pagination::new(2, PageSize::Ten)));

        let outcome = orch.apply_change(CriteriaDelta::new().with_source("ghost"));
        assert!(outcome.query.is_none());
        assert_eq!(orch.criteria().source_id(), Some("pets"));
        assert_eq!(orch.criteria().pagination.current_page, 2);
    }

    #[test]
    fn test_operator_and_dates_keep_pagination() {
        let (mut orch, _) = ready();
        orch.apply_change(CriteriaDelta::new().with_pagination(Pagination::new(4, PageSize::Ten)));

        let query = orch
            .apply_change(
                CriteriaDelta::new()
                    .with_operator(Operator::And)
                    .with_date_range(DateRange::new(Some(10), Some(20))),
            )
            .query
            .unwrap();

        assert_eq!(query.request.pagination.current_page, 4);
        assert_eq!(query.request.search.operator, Operator::And);
        assert_eq!(query.request.date.from, Some(10));
        assert_eq!(query.request.date.to, Some(20));
    }

    #[test]
    fn test_phrase_change_requests_lookup_and_synonyms() {
        let (mut orch, _) = ready();
        let outcome = orch.apply_change(CriteriaDelta::new().with_phrase("  cat  "));
        assert_eq!(orch.criteria().phrase, "cat");
        assert!(orch.criteria().use_synonyms);
        assert_eq!(outcome.lookup.unwrap().keyword, "cat");
        assert!(outcome.query.unwrap().request.use_synonyms);
    }

    #[test]
    fn test_same_phrase_keeps_user_synonym_choice() {
        let (mut orch, _) = ready();
        let outcome = orch.apply_change(CriteriaDelta::new().with_phrase("cat"));
        let lookup = outcome.lookup.unwrap();
        orch.merge_lookup(lookup.token, Ok(Some(DictionaryEntry::new("cat", "", ["kitty"]))));

        // expansion on, then off: use_synonyms follows the user
        orch.toggle_synonyms().unwrap();
        let outcome = orch.toggle_synonyms().unwrap();
        assert!(!outcome.query.unwrap().request.use_synonyms);

        let outcome = orch.apply_change(CriteriaDelta::new().with_phrase("cat "));
        assert!(outcome.lookup.is_none());
        assert!(!orch.criteria().use_synonyms);
    }

    #[test]
    fn test_synonym_lookup_race() {
        let (mut orch, _) = ready();
        let cat = orch.apply_change(CriteriaDelta::new().with_phrase("cat")).lookup.unwrap();
        assert!(orch.merge_lookup(cat.token, Ok(Some(DictionaryEntry::new("cat", "", ["kitty"])))));

        let dog = orch.apply_change(CriteriaDelta::new().with_phrase("dog")).lookup.unwrap();
        assert!(orch.resolver().current_entry().is_none());

        let cow = orch.apply_change(CriteriaDelta::new().with_phrase("cow")).lookup.unwrap();
        assert!(!orch.merge_lookup(dog.token, Ok(Some(DictionaryEntry::new("dog", "", ["hound"])))));
        assert!(orch.resolver().current_entry().is_none());

        assert!(orch.merge_lookup(cow.token, Ok(Some(DictionaryEntry::new("cow", "", ["cattle"])))));
        assert_eq!(orch.resolver().suggestions(), ["cattle".to_string()]);
    }

    #[test]
    fn test_dictionary_hit_from_query() {
        let (mut orch, _) = ready();
        let query = orch.apply_change(CriteriaDelta::new().with_phrase("cat")).query.unwrap();

        let mut result = result_with(&["Tom"]);
        result.dictionary_hit = Some(DictionaryEntry::new("cat", "feline", ["kitty", "tomcat"]));
        orch.merge_query(query.token, Ok(result));

        assert!(orch.resolver().is_suggestion_visible());
        assert_eq!(orch.resolver().suggestions().len(), 2);
    }

    #[test]
    fn test_operator_visibility() {
        let (mut orch, _) = ready();
        orch.apply_change(CriteriaDelta::new().with_phrase("cat"));
        assert!(!orch.operator_selector_visible());
        orch.apply_change(CriteriaDelta::new().with_phrase("black cat"));
        assert!(orch.operator_selector_visible());
        orch.apply_change(CriteriaDelta::new().with_phrase("a cat"));
        assert!(!orch.operator_selector_visible());
    }

    #[test]
    fn test_failed_query_preserves_rows() {
        let (mut orch, first) = ready();
        orch.merge_query(first.token, Ok(result_with(&["r1", "r2"])));

        let next = orch
            .apply_change(CriteriaDelta::new().with_pagination(Pagination::new(1, PageSize::Ten)))
            .query
            .unwrap();
        orch.merge_query(next.token, Err(DashboardError::Rejected("Index unavailable".to_string())));

        assert_eq!(names(orch.view()), vec!["r1", "r2"]);
        let notification = orch.notification().unwrap();
        assert!(notification.is_error());
        assert_eq!(notification.message, "Index unavailable");
        assert_eq!(orch.phase(), Phase::Ready);

        orch.dismiss_notification();
        assert!(orch.notification().is_none());
    }

    #[test]
    fn test_highlight_follows_phrase() {
        let (mut orch, _) = ready();
        let query = orch.apply_change(CriteriaDelta::new().with_phrase("tom")).query.unwrap();
        orch.merge_query(query.token, Ok(result_with(&["Tom"])));
        assert_eq!(orch.view().columns[0].emphasis, Emphasis::Matched);
        assert_eq!(orch.view().columns[1].emphasis, Emphasis::Related);

        let query = orch.apply_change(CriteriaDelta::new().with_phrase("")).query.unwrap();
        orch.merge_query(query.token, Ok(result_with(&["Tom"])));
        assert!(orch.view().columns.iter().all(|c| c.emphasis == Emphasis::Plain));
    }

    #[test]
    fn test_dispose_stops_merges() {
        let (mut orch, first) = ready();
        orch.dispose();
        assert!(!orch.merge_query(first.token, Ok(result_with(&["late"]))));
        assert!(orch.view().rows.is_empty());
        assert!(orch.apply_change(CriteriaDelta::new().with_phrase("cat")).query.is_none());
        assert!(orch.export_request().is_none());
    }

    #[test]
    fn test_reset_keeps_source() {
        let (mut orch, _) = ready();
        orch.apply_change(
            CriteriaDelta::new()
                .with_phrase("black cat")
                .with_operator(Operator::And)
                .with_pagination(Pagination::new(5, PageSize::Fifty)),
        );

        let query = orch.reset().query.unwrap();
        assert_eq!(query.request.search.phrase, "");
        assert_eq!(query.request.search.operator, Operator::Or);
        assert_eq!(query.request.pagination, Pagination::default());
        assert_eq!(query.request.source, "pets");
        assert!(orch.resolver().current_entry().is_none());
    }

    #[test]
    fn test_toggle_synonyms_without_entry() {
        let (mut orch, _) = ready();
        assert!(orch.toggle_synonyms().is_err());
    }

    #[test]
    fn test_toggle_synonyms_after_dispose() {
        let (mut orch, _) = ready();
        let lookup = orch.apply_change(CriteriaDelta::new().with_phrase("cat")).lookup.unwrap();
        orch.merge_lookup(lookup.token, Ok(Some(DictionaryEntry::new("cat", "", ["kitty"]))));
        orch.dispose();

        let outcome = orch.toggle_synonyms().unwrap();
        assert_eq!(outcome, ChangeOutcome::default());
        assert!(!orch.resolver().expansion_requested());
        assert!(orch.criteria().use_synonyms);
    }

    #[test]
    fn test_superseded_catalog_fetch_ignored() {
        let (mut orch, _) = ready();
        let older = orch.reopen_sources();
        let newer = orch.reopen_sources();

        let mut refreshed = sources();
        refreshed.push(SourceDescriptor::new("logs", "Logs"));
        assert!(orch.merge_sources(newer, Ok(refreshed)).query.is_none());
        assert_eq!(orch.catalog().sources().len(), 3);

        // The older listing lands last and must not replace the newer one
        let outcome = orch.merge_sources(older, Ok(vec![SourceDescriptor::new("orders", "Orders")]));
        assert_eq!(outcome, ChangeOutcome::default());
        assert_eq!(orch.catalog().sources().len(), 3);
        assert_eq!(orch.criteria().source_id(), Some("pets"));
        assert!(orch.notification().is_none());
    }

    #[test]
    fn test_export_notifications() {
        let (mut orch, _) = ready();
        assert_eq!(orch.export_request().unwrap().source, "pets");

        orch.merge_export(Ok(None));
        assert_eq!(orch.notification().unwrap().kind, NotificationKind::Success);

        orch.merge_export(Err(DashboardError::Fetch("boom".to_string())));
        assert!(orch.notification().unwrap().is_error());
    }

    #[test]
    fn test_configured_page_size() {
        let mut orch = SearchOrchestrator::with_page_size(PageSize::Fifty);
        let generation = orch.mount().unwrap();
        let query = orch.merge_sources(generation, Ok(sources())).query.unwrap();
        assert_eq!(query.request.pagination.page_size, PageSize::Fifty);
    }
}
