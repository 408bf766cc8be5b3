//! HTTP News Retriever
//!
//! Talks to the local semantic-search sidecar that fronts the vector
//! store. A dead or unreachable sidecar degrades to an unavailable-store
//! result rather than an error, so a missing knowledge base never kills
//! an evaluation cycle.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{NewsHits, NewsRetriever};
use crate::error::{Result, TraderError};

const DEFAULT_SEARCH_URL: &str = "http://127.0.0.1:8900/search";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// REST client for the semantic-search sidecar
pub struct HttpNewsRetriever {
    client: reqwest::Client,
    search_url: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    documents: Vec<String>,
}

impl HttpNewsRetriever {
    pub fn new(search_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TraderError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            search_url: search_url.into(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let search_url =
            std::env::var("NEWS_API_URL").unwrap_or_else(|_| DEFAULT_SEARCH_URL.into());
        Self::new(search_url)
    }
}

#[async_trait]
impl NewsRetriever for HttpNewsRetriever {
    async fn search(&self, query: &str, top_k: usize) -> Result<NewsHits> {
        let response = match self
            .client
            .post(&self.search_url)
            .json(&SearchRequest { query, top_k })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "news store unreachable");
                return Ok(NewsHits::unavailable());
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "news store rejected query");
            return Ok(NewsHits::unavailable());
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| TraderError::NewsUnavailable(format!("malformed search response: {e}")))?;

        let mut items = parsed.documents;
        items.truncate(top_k);

        Ok(NewsHits {
            items,
            store_available: true,
        })
    }
}
