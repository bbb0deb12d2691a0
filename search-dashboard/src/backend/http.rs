//! HTTP backend client
//!
//! Talks JSON to the search backend with reqwest.

use super::{DictionaryRepository, SearchBackend};
use crate::config::BackendConfig;
use crate::error::{DashboardError, Result};
use crate::model::{ApiResponse, DictionaryEntry, SearchPayload, SearchRequest, SearchResult, SourceDescriptor};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// reqwest-based implementation of both backend traits
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client with the configured timeout
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DashboardError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode the envelope, mapping non-2xx statuses to fetch errors
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<ApiResponse<T>> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Backend request failed with status {}: {}", status, error_text);

            // Rejections may come with an error status and a regular envelope
            if let Ok(envelope) = serde_json::from_str::<ApiResponse<T>>(&error_text) {
                if !envelope.success {
                    return Ok(envelope);
                }
            }
            return Err(DashboardError::Fetch(format!("HTTP {}", status)));
        }

        Ok(response.json::<ApiResponse<T>>().await?)
    }
}

#[async_trait::async_trait]
impl SearchBackend for HttpBackend {
    async fn fetch_sources(&self) -> Result<Vec<SourceDescriptor>> {
        debug!("GET {}/sources", self.base_url);
        let response = self.client.get(self.url("/sources")).send().await?;
        Self::decode::<Vec<SourceDescriptor>>(response).await?.into_data()
    }

    async fn search(&self, request: SearchRequest) -> Result<SearchResult> {
        debug!(
            "POST {}/search source={} page={}",
            self.base_url, request.source, request.pagination.current_page
        );
        let response = self.client.post(self.url("/search")).json(&request).send().await?;
        let payload = Self::decode::<SearchPayload>(response).await?.into_data()?;
        Ok(payload.into())
    }

    async fn export(&self, request: SearchRequest) -> Result<Option<String>> {
        debug!("POST {}/search/export source={}", self.base_url, request.source);
        let response = self
            .client
            .post(self.url("/search/export"))
            .json(&request)
            .send()
            .await?;
        Self::decode::<serde_json::Value>(response).await?.into_ack()
    }
}

#[async_trait::async_trait]
impl DictionaryRepository for HttpBackend {
    async fn list(&self) -> Result<Vec<DictionaryEntry>> {
        debug!("GET {}/synonyms", self.base_url);
        let response = self.client.get(self.url("/synonyms")).send().await?;
        Self::decode::<Vec<DictionaryEntry>>(response).await?.into_data()
    }

    async fn lookup(&self, keyword: &str) -> Result<Option<DictionaryEntry>> {
        let entries = self.list().await?;
        Ok(entries
            .into_iter()
            .find(|entry| entry.has_keyword(keyword)))
    }

    async fn upsert(&self, entry: DictionaryEntry) -> Result<()> {
        debug!("PUT {}/synonyms keyword={}", self.base_url, entry.keyword);
        let response = self.client.put(self.url("/synonyms")).json(&entry).send().await?;
        Self::decode::<serde_json::Value>(response).await?.into_ack()?;
        Ok(())
    }

    async fn remove(&self, keyword: &str) -> Result<()> {
        debug!("DELETE {}/synonyms/{}", self.base_url, keyword);
        let mut url = reqwest::Url::parse(&self.url("/synonyms"))
            .map_err(|e| DashboardError::Config(format!("Invalid backend URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| DashboardError::Config("Backend URL cannot carry a path".to_string()))?
            .push(keyword);
        let response = self.client.delete(url).send().await?;
        Self::decode::<serde_json::Value>(response).await?.into_ack()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8080/api/");
        assert_eq!(backend.base_url(), "http://localhost:8080/api");
        assert_eq!(backend.url("/sources"), "http://localhost:8080/api/sources");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_fetch_error() {
        // Port 9 (discard) is not expected to serve HTTP
        let backend = HttpBackend::new("http://127.0.0.1:9");
        let err = backend.fetch_sources().await.unwrap_err();
        assert!(matches!(err, DashboardError::Fetch(_)));
    }
}
