//! In-memory backend for tests
//!
//! Replies are scripted in order. A reply can be deferred behind a
//! [`ReplyGate`] so tests can complete queries out of issue order.

use super::{DictionaryRepository, SearchBackend};
use crate::error::{DashboardError, Result};
use crate::model::{DictionaryEntry, PageInfo, SearchRequest, SearchResult, SourceDescriptor};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

/// A scripted backend answer
#[derive(Debug, Clone)]
pub enum MockReply<T> {
    Ok(T),
    Fetch(String),
    Rejected(String),
}

impl<T> MockReply<T> {
    fn into_result(self) -> Result<T> {
        match self {
            MockReply::Ok(value) => Ok(value),
            MockReply::Fetch(message) => Err(DashboardError::Fetch(message)),
            MockReply::Rejected(message) => Err(DashboardError::Rejected(message)),
        }
    }
}

enum Scripted<T> {
    Ready(MockReply<T>),
    Deferred(oneshot::Receiver<MockReply<T>>),
}

/// Releases a deferred reply
pub struct ReplyGate<T> {
    sender: oneshot::Sender<MockReply<T>>,
}

impl<T> ReplyGate<T> {
    pub fn release(self, reply: MockReply<T>) {
        // The query may have been dropped with its task
        let _ = self.sender.send(reply);
    }
}

/// Mock backend implementation for testing
pub struct MockBackend {
    sources: Mutex<VecDeque<Scripted<Vec<SourceDescriptor>>>>,
    searches: Mutex<VecDeque<Scripted<SearchResult>>>,
    exports: Mutex<VecDeque<MockReply<Option<String>>>>,
    dictionary: Mutex<Vec<DictionaryEntry>>,
    search_log: Mutex<Vec<SearchRequest>>,
    fallback_sources: Vec<SourceDescriptor>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_sources(Vec::new())
    }

    /// Backend that lists `sources` whenever nothing else is scripted
    pub fn with_sources(sources: Vec<SourceDescriptor>) -> Self {
        Self {
            sources: Mutex::new(VecDeque::new()),
            searches: Mutex::new(VecDeque::new()),
            exports: Mutex::new(VecDeque::new()),
            dictionary: Mutex::new(Vec::new()),
            search_log: Mutex::new(Vec::new()),
            fallback_sources: sources,
        }
    }

    pub fn with_dictionary(self, entries: Vec<DictionaryEntry>) -> Self {
        *lock(&self.dictionary) = entries;
        self
    }

    pub fn push_sources(&self, reply: MockReply<Vec<SourceDescriptor>>) {
        lock(&self.sources).push_back(Scripted::Ready(reply));
    }

    pub fn defer_sources(&self) -> ReplyGate<Vec<SourceDescriptor>> {
        let (sender, receiver) = oneshot::channel();
        lock(&self.sources).push_back(Scripted::Deferred(receiver));
        ReplyGate { sender }
    }

    pub fn push_search(&self, reply: MockReply<SearchResult>) {
        lock(&self.searches).push_back(Scripted::Ready(reply));
    }

    /// Script the next search to wait until the returned gate is released
    pub fn defer_search(&self) -> ReplyGate<SearchResult> {
        let (sender, receiver) = oneshot::channel();
        lock(&self.searches).push_back(Scripted::Deferred(receiver));
        ReplyGate { sender }
    }

    pub fn push_export(&self, reply: MockReply<Option<String>>) {
        lock(&self.exports).push_back(reply);
    }

    /// Every search request received so far
    pub fn search_requests(&self) -> Vec<SearchRequest> {
        lock(&self.search_log).clone()
    }

    pub fn dictionary_entries(&self) -> Vec<DictionaryEntry> {
        lock(&self.dictionary).clone()
    }

    /// Empty result echoing the requested page, used when nothing is scripted
    fn echo(request: &SearchRequest) -> SearchResult {
        SearchResult {
            pagination: PageInfo {
                current_page: request.pagination.current_page,
                page_size: request.pagination.page_size.get(),
                total_hits: 0,
                total_pages: 0,
            },
            ..SearchResult::default()
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn resolve<T>(scripted: Scripted<T>) -> Result<T> {
    match scripted {
        Scripted::Ready(reply) => reply.into_result(),
        Scripted::Deferred(receiver) => receiver
            .await
            .map_err(|_| DashboardError::Fetch("Deferred reply dropped".to_string()))?
            .into_result(),
    }
}

#[async_trait::async_trait]
impl SearchBackend for MockBackend {
    async fn fetch_sources(&self) -> Result<Vec<SourceDescriptor>> {
        let scripted = lock(&self.sources).pop_front();
        match scripted {
            Some(scripted) => resolve(scripted).await,
            None => Ok(self.fallback_sources.clone()),
        }
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResult> {
        debug!("MockBackend: search {:?}", request);
        lock(&self.search_log).push(request.clone());

        let scripted = lock(&self.searches).pop_front();
        match scripted {
            Some(scripted) => resolve(scripted).await,
            None => Ok(Self::echo(&request)),
        }
    }

    async fn export(&self, _request: SearchRequest) -> Result<Option<String>> {
        let reply = lock(&self.exports).pop_front();
        reply.unwrap_or(MockReply::Ok(None)).into_result()
    }
}

#[async_trait::async_trait]
impl DictionaryRepository for MockBackend {
    async fn list(&self) -> Result<Vec<DictionaryEntry>> {
        Ok(self.dictionary_entries())
    }

    async fn lookup(&self, keyword: &str) -> Result<Option<DictionaryEntry>> {
        Ok(lock(&self.dictionary)
            .iter()
            .find(|entry| entry.has_keyword(keyword))
            .cloned())
    }

    async fn upsert(&self, entry: DictionaryEntry) -> Result<()> {
        let mut entries = lock(&self.dictionary);
        match entries.iter_mut().find(|e| e.has_keyword(&entry.keyword)) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    async fn remove(&self, keyword: &str) -> Result<()> {
        let mut entries = lock(&self.dictionary);
        let before = entries.len();
        entries.retain(|e| !e.has_keyword(keyword));
        if entries.len() == before {
            return Err(DashboardError::Rejected(format!("Keyword not found: {}", keyword)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Pagination, SearchCriteria, SourceSelection};

    fn request() -> SearchRequest {
        let criteria = SearchCriteria {
            source: Some(SourceSelection::new("pets")),
            ..SearchCriteria::default()
        };
        SearchRequest::from_criteria(&criteria).unwrap()
    }

    #[tokio::test]
    async fn test_deferred_search_waits_for_gate() {
        let backend = std::sync::Arc::new(MockBackend::new());
        let gate = backend.defer_search();

        let task = {
            let backend = backend.clone();
            tokio::spawn(async move { backend.search(request()).await })
        };

        gate.release(MockReply::Rejected("nope".to_string()));
        let result = task.await.unwrap();
        assert!(matches!(result, Err(DashboardError::Rejected(_))));
        assert_eq!(backend.search_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unscripted_search_echoes_page() {
        let backend = MockBackend::new();
        let mut req = request();
        req.pagination = Pagination::new(4, Default::default());
        let result = backend.search(req).await.unwrap();
        assert_eq!(result.pagination.current_page, 4);
        assert!(result.rows.is_empty());
    }

    #[tokio::test]
    async fn test_dictionary_roundtrip() {
        let backend = MockBackend::new();
        backend
            .upsert(DictionaryEntry::new("cat", "feline", ["kitty"]))
            .await
            .unwrap();
        assert!(backend.lookup("CAT").await.unwrap().is_some());
        backend.remove("cat").await.unwrap();
        assert!(backend.remove("cat").await.is_err());
    }

    #[tokio::test]
    async fn test_lookup_matches_primary_token() {
        let backend = MockBackend::new().with_dictionary(vec![DictionaryEntry::new("Éclair", "", ["choux"])]);
        let keyword = crate::synonyms::primary_token("Éclair au chocolat").unwrap();

        let entry = backend.lookup(&keyword).await.unwrap();
        assert_eq!(entry.unwrap().synonyms, vec!["choux"]);

        backend.remove("ÉCLAIR").await.unwrap();
        assert!(backend.dictionary_entries().is_empty());
    }
}
