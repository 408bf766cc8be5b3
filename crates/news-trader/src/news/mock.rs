//! Mock News Retriever

use async_trait::async_trait;

use super::{NewsHits, NewsRetriever};
use crate::error::Result;

/// Canned-response retriever for tests and demos
#[derive(Default)]
pub struct MockNewsRetriever {
    items: Vec<String>,
    available: bool,
}

impl MockNewsRetriever {
    /// Store answering with the given snippets
    pub fn with_items(items: Vec<String>) -> Self {
        Self {
            items,
            available: true,
        }
    }

    /// Store that is not reachable
    pub fn offline() -> Self {
        Self {
            items: Vec::new(),
            available: false,
        }
    }
}

#[async_trait]
impl NewsRetriever for MockNewsRetriever {
    async fn search(&self, _query: &str, top_k: usize) -> Result<NewsHits> {
        if !self.available {
            return Ok(NewsHits::unavailable());
        }

        let mut items = self.items.clone();
        items.truncate(top_k);

        Ok(NewsHits {
            items,
            store_available: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_top_k_truncation() {
        let retriever = MockNewsRetriever::with_items(vec![
            "a".into(),
            "b".into(),
            "c".into(),
        ]);
        let hits = retriever.search("anything", 2).await.unwrap();
        assert_eq!(hits.items, vec!["a", "b"]);
        assert!(hits.store_available);
    }
}
