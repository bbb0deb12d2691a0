//! In-memory datasets and synonym dictionary

use crate::error::{Result, StubError};
use search_dashboard::model::{
    qualifying_tokens, Column, ColumnType, DictionaryEntry, Operator, Row, SearchPayload, SearchRequest,
    SourceDescriptor,
};
use search_dashboard::model::wire::RawPagination;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// One searchable source and its rows
#[derive(Debug, Clone)]
pub struct Dataset {
    pub descriptor: SourceDescriptor,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

/// Backend state shared by the handlers
pub struct StubStore {
    datasets: Vec<Dataset>,
    dictionary: RwLock<Vec<DictionaryEntry>>,
    /// Artificial search latency per source id
    latency: HashMap<String, Duration>,
}

impl StubStore {
    pub fn new(datasets: Vec<Dataset>, dictionary: Vec<DictionaryEntry>) -> Self {
        Self {
            datasets,
            dictionary: RwLock::new(dictionary),
            latency: HashMap::new(),
        }
    }

    /// Delay every search against `source`
    pub fn with_latency(mut self, source: impl Into<String>, delay: Duration) -> Self {
        self.latency.insert(source.into(), delay);
        self
    }

    pub fn sources(&self) -> Vec<SourceDescriptor> {
        self.datasets.iter().map(|d| d.descriptor.clone()).collect()
    }

    fn dataset(&self, id: &str) -> Result<&Dataset> {
        self.datasets
            .iter()
            .find(|d| d.descriptor.id == id)
            .ok_or_else(|| StubError::NotFound(format!("Unknown source: {}", id)))
    }

    /// Run a search
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchPayload> {
        if let Some(delay) = self.latency.get(&request.source) {
            tokio::time::sleep(*delay).await;
        }

        let dataset = self.dataset(&request.source)?;
        let hit = self.entry_for(&request.search.phrase).await;
        let expansion = if request.use_synonyms {
            hit.as_ref().map(|e| e.synonyms.as_slice()).unwrap_or(&[])
        } else {
            &[]
        };
        let groups = term_groups(&request.search.phrase, expansion);
        let operator = if qualifying_tokens(&request.search.phrase) >= 2 {
            request.search.operator
        } else {
            Operator::Or
        };

        let search_field = request
            .search
            .field
            .clone()
            .unwrap_or_else(|| dataset.descriptor.search_field.clone());
        let date_field = request
            .date
            .field
            .clone()
            .unwrap_or_else(|| dataset.descriptor.date_field.clone());

        let matching: Vec<&Row> = dataset
            .rows
            .iter()
            .filter(|row| matches_terms(row, &search_field, &groups, operator))
            .filter(|row| within_dates(row, &date_field, request.date.from, request.date.to))
            .collect();

        let step = request.pagination.page_size.get();
        let total_hits = matching.len() as u64;
        let total_pages = (matching.len() as u32).div_ceil(step);
        let start = (request.pagination.current_page as usize).saturating_mul(step as usize);
        let results: Vec<Row> = matching
            .into_iter()
            .skip(start)
            .take(step as usize)
            .cloned()
            .collect();

        debug!(
            "Search source={} phrase={:?} hits={} page={}",
            request.source, request.search.phrase, total_hits, request.pagination.current_page
        );

        Ok(SearchPayload {
            results,
            columns: dataset.columns.clone(),
            pagination: RawPagination {
                current_page: request.pagination.current_page,
                step,
                total_hits,
                total_pages,
            },
            dictionary: hit,
            source: Some(dataset.descriptor.clone()),
        })
    }

    /// Count what an export would write
    pub async fn export(&self, request: &SearchRequest) -> Result<u64> {
        let mut all = request.clone();
        all.pagination.current_page = 0;
        let payload = self.search(&all).await?;
        info!("Export of {} rows from {}", payload.pagination.total_hits, request.source);
        Ok(payload.pagination.total_hits)
    }

    /// Dictionary entry for the first token of `phrase`
    async fn entry_for(&self, phrase: &str) -> Option<DictionaryEntry> {
        let keyword = phrase.split_whitespace().next()?;
        self.dictionary
            .read()
            .await
            .iter()
            .find(|e| e.has_keyword(keyword))
            .cloned()
    }

    pub async fn entries(&self) -> Vec<DictionaryEntry> {
        self.dictionary.read().await.clone()
    }

    /// Insert or replace by keyword (Unicode case-insensitive). Returns `true` when created.
    pub async fn upsert(&self, entry: DictionaryEntry) -> Result<bool> {
        if entry.keyword.is_empty() {
            return Err(StubError::BadRequest("Keyword is required".to_string()));
        }

        let mut entries = self.dictionary.write().await;
        match entries
            .iter_mut()
            .find(|e| e.has_keyword(&entry.keyword))
        {
            Some(existing) => {
                *existing = entry;
                Ok(false)
            }
            None => {
                entries.push(entry);
                Ok(true)
            }
        }
    }

    pub async fn remove(&self, keyword: &str) -> Result<()> {
        let mut entries = self.dictionary.write().await;
        let before = entries.len();
        entries.retain(|e| !e.has_keyword(keyword));
        if entries.len() == before {
            return Err(StubError::NotFound(format!("Keyword not found: {}", keyword)));
        }
        Ok(())
    }
}

/// One group per phrase token; the first group also accepts the synonyms
fn term_groups(phrase: &str, synonyms: &[String]) -> Vec<Vec<String>> {
    let mut groups: Vec<Vec<String>> = phrase
        .split_whitespace()
        .map(|token| vec![token.to_lowercase()])
        .collect();
    if let Some(first) = groups.first_mut() {
        first.extend(synonyms.iter().map(|s| s.to_lowercase()));
    }
    groups
}

fn matches_terms(row: &Row, field: &str, groups: &[Vec<String>], operator: Operator) -> bool {
    if groups.is_empty() {
        return true;
    }

    let text = match row.get(field) {
        Some(serde_json::Value::String(s)) => s.to_lowercase(),
        Some(serde_json::Value::Null) | None => return false,
        Some(other) => other.to_string().to_lowercase(),
    };
    let group_matches = |group: &Vec<String>| group.iter().any(|term| text.contains(term.as_str()));

    match operator {
        Operator::And => groups.iter().all(group_matches),
        Operator::Or => groups.iter().any(group_matches),
    }
}

fn within_dates(row: &Row, field: &str, from: Option<i64>, to: Option<i64>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(value) = row.get(field).and_then(|v| v.as_i64()) else {
        return false;
    };
    from.map_or(true, |from| value >= from) && to.map_or(true, |to| value <= to)
}

/// Sample data served by the binary and used in tests
pub fn sample_store() -> StubStore {
    let pets = Dataset {
        descriptor: SourceDescriptor::new("pets", "Pets")
            .with_fields("name", "born")
            .with_timestamp(1_709_474_700),
        columns: vec![
            Column::new("id", "Id", ColumnType::Numeric),
            Column::new("name", "Name", ColumnType::String),
            Column::new("species", "Species", ColumnType::String),
            Column::new("born", "Born", ColumnType::Date),
        ],
        rows: vec![
            pet(1, "Tom the black cat", "cat", 1_577_836_800),
            pet(2, "Kitty Purry", "cat", 1_609_459_200),
            pet(3, "Rex", "dog", 1_640_995_200),
            pet(4, "Black hound Shadow", "dog", 1_672_531_200),
            pet(5, "Tomcat Felix", "cat", 1_704_067_200),
            pet(6, "Daisy", "cow", 1_706_745_600),
        ],
    };

    let orders = Dataset {
        descriptor: SourceDescriptor::new("orders", "Orders").with_fields("item", "placed"),
        columns: vec![
            Column::new("order", "Order", ColumnType::Numeric),
            Column::new("item", "Item", ColumnType::String),
            Column::new("placed", "Placed", ColumnType::Date),
            Column::new("paid", "Paid", ColumnType::Boolean),
        ],
        rows: (1..=25)
            .map(|n| {
                let mut row = Row::new();
                row.insert("order".to_string(), serde_json::json!(n));
                row.insert("item".to_string(), serde_json::json!(format!("Cat food pack {}", n)));
                row.insert("placed".to_string(), serde_json::json!(1_700_000_000 + n * 86_400));
                row.insert("paid".to_string(), serde_json::json!(n % 2 == 0));
                row
            })
            .collect(),
    };

    let dictionary = vec![
        DictionaryEntry::new("cat", "Small domesticated feline", ["kitty", "tomcat"]),
        DictionaryEntry::new("dog", "Domesticated canine", ["hound", "pup"]),
    ];

    StubStore::new(vec![pets, orders], dictionary)
}

fn pet(id: u64, name: &str, species: &str, born: i64) -> Row {
    let mut row = Row::new();
    row.insert("id".to_string(), serde_json::json!(id));
    row.insert("name".to_string(), serde_json::json!(name));
    row.insert("species".to_string(), serde_json::json!(species));
    row.insert("born".to_string(), serde_json::json!(born));
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_dashboard::model::{PageSize, Pagination, SearchCriteria, SourceSelection};

    fn request(source: &str, phrase: &str) -> SearchRequest {
        let criteria = SearchCriteria {
            phrase: phrase.to_string(),
            source: Some(SourceSelection::new(source)),
            ..SearchCriteria::default()
        };
        SearchRequest::from_criteria(&criteria).unwrap()
    }

    fn names(payload: &SearchPayload) -> Vec<&str> {
        payload
            .results
            .iter()
            .filter_map(|r| r.get("name").and_then(|v| v.as_str()))
            .collect()
    }

    #[tokio::test]
    async fn test_phrase_filter() {
        let store = sample_store();
        let payload = store.search(&request("pets", "tom")).await.unwrap();
        assert_eq!(names(&payload), vec!["Tom the black cat", "Tomcat Felix"]);
        assert_eq!(payload.source.unwrap().search_field, "name");
    }

    #[tokio::test]
    async fn test_operator() {
        let store = sample_store();
        let mut req = request("pets", "black cat");
        assert_eq!(store.search(&req).await.unwrap().pagination.total_hits, 3);

        req.search.operator = Operator::And;
        let payload = store.search(&req).await.unwrap();
        assert_eq!(names(&payload), vec!["Tom the black cat"]);
    }

    #[tokio::test]
    async fn test_synonym_expansion() {
        let store = sample_store();
        let mut req = request("pets", "cat");
        let plain = store.search(&req).await.unwrap();
        assert_eq!(plain.pagination.total_hits, 2);
        assert_eq!(plain.dictionary.unwrap().keyword, "cat");

        req.use_synonyms = true;
        let expanded = store.search(&req).await.unwrap();
        assert_eq!(expanded.pagination.total_hits, 3);
    }

    #[tokio::test]
    async fn test_pagination_and_dates() {
        let store = sample_store();
        let mut req = request("orders", "");
        req.pagination = Pagination::new(2, PageSize::Ten);
        let payload = store.search(&req).await.unwrap();
        assert_eq!(payload.results.len(), 5);
        assert_eq!(payload.pagination.total_pages, 3);
        assert_eq!(payload.pagination.step, 10);

        req.pagination = Pagination::default();
        req.date.from = Some(1_700_000_000 + 86_400);
        req.date.to = Some(1_700_000_000 + 3 * 86_400);
        assert_eq!(store.search(&req).await.unwrap().pagination.total_hits, 3);
    }

    #[tokio::test]
    async fn test_unknown_source() {
        let store = sample_store();
        assert!(matches!(
            store.search(&request("ghost", "")).await,
            Err(StubError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_dictionary_crud() {
        let store = sample_store();
        assert!(store
            .upsert(DictionaryEntry::new("cow", "Bovine", ["cattle"]))
            .await
            .unwrap());
        assert!(!store
            .upsert(DictionaryEntry::new("COW", "Bovine", ["cattle", "ox"]))
            .await
            .unwrap());
        assert_eq!(store.entries().await.len(), 3);

        store.remove("cow").await.unwrap();
        assert!(store.remove("cow").await.is_err());
        assert!(store.upsert(DictionaryEntry::new("", "", ["x"])).await.is_err());
    }

    #[tokio::test]
    async fn test_dictionary_keywords_fold_unicode_case() {
        let store = sample_store();
        assert!(store
            .upsert(DictionaryEntry::new("Éclair", "Choux pastry", ["choux"]))
            .await
            .unwrap());
        assert!(!store
            .upsert(DictionaryEntry::new("ÉCLAIR", "Choux pastry", ["choux", "profiterole"]))
            .await
            .unwrap());

        let payload = store.search(&request("pets", "éclair au chocolat")).await.unwrap();
        assert_eq!(payload.dictionary.unwrap().synonyms, vec!["choux", "profiterole"]);

        store.remove("éclair").await.unwrap();
        assert_eq!(store.entries().await.len(), 2);
    }
}
