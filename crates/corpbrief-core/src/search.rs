//! Client for the external web-search service.
//!
//! The search contract is deliberately small: one query in, an optional
//! free-text answer plus an ordered list of hits out. Failures are errors,
//! never partial responses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::SecretValue;
use crate::error::CorpbriefError;

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

/// One search hit. Hit shapes vary across search API versions, so the URL
/// may arrive under `url`, `link`, or a nested `source` object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Nested source object some hit shapes carry instead of a flat URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SearchHit {
    /// Candidate URL for this hit: the first non-empty value among `url`,
    /// `link`, `source.url`, and `source.id`, trimmed. `None` when every
    /// candidate is empty or the winner trims down to nothing.
    pub fn url_candidate(&self) -> Option<&str> {
        let source = self.source.as_ref();
        let raw = non_empty(self.url.as_deref())
            .or_else(|| non_empty(self.link.as_deref()))
            .or_else(|| source.and_then(|s| non_empty(s.url.as_deref())))
            .or_else(|| source.and_then(|s| non_empty(s.id.as_deref())))?;
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Response from the search service for a single query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// Web-search service contract.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<SearchResponse, CorpbriefError>;
}

/// Production search client backed by the Tavily HTTP API.
pub struct TavilySearch {
    api_key: SecretValue,
    http: reqwest::Client,
}

impl TavilySearch {
    pub fn new(api_key: SecretValue) -> Self {
        Self {
            api_key,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SearchClient for TavilySearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<SearchResponse, CorpbriefError> {
        debug!(%query, max_results, "querying search service");

        let response = self
            .http
            .post(TAVILY_ENDPOINT)
            .json(&json!({
                "api_key": self.api_key.expose(),
                "query": query,
                "max_results": max_results,
                "include_answer": true,
            }))
            .send()
            .await
            .map_err(|err| CorpbriefError::Search(err.to_string()))?
            .error_for_status()
            .map_err(|err| CorpbriefError::Search(err.to_string()))?;

        response
            .json::<SearchResponse>()
            .await
            .map_err(|err| CorpbriefError::Search(err.to_string()))
    }
}
