//! News Retrieval
//!
//! Client-side view of the semantic news store. The store itself
//! (embedding, similarity ranking, ingestion/deduplication) is an
//! external collaborator; this module only consumes its search
//! interface.

mod http;
mod mock;

pub use http::HttpNewsRetriever;
pub use mock::MockNewsRetriever;

use async_trait::async_trait;

use crate::error::Result;

/// Result of one semantic search.
///
/// An empty item list is not an error; `store_available = false`
/// distinguishes "nothing relevant" from "store uninitialized or
/// unreachable".
#[derive(Clone, Debug, Default)]
pub struct NewsHits {
    /// Ranked snippets, most relevant first, length <= requested top_k
    pub items: Vec<String>,

    /// Whether the backing store answered at all
    pub store_available: bool,
}

impl NewsHits {
    pub fn unavailable() -> Self {
        Self {
            items: Vec::new(),
            store_available: false,
        }
    }
}

/// Semantic news search over the backing corpus
#[async_trait]
pub trait NewsRetriever: Send + Sync {
    /// Top-k snippets ranked by relevance, most relevant first
    async fn search(&self, query: &str, top_k: usize) -> Result<NewsHits>;
}
