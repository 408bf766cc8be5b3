//! News Search Tool
//!
//! Retrieves the most relevant news snippets for a query from the local
//! semantic store.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

use crate::news::NewsRetriever;

const DEFAULT_TOP_K: usize = 3;
const MAX_TOP_K: usize = 10;

/// Tool for semantic news retrieval
pub struct NewsSearchTool {
    retriever: Arc<dyn NewsRetriever>,
}

impl NewsSearchTool {
    pub fn new(retriever: Arc<dyn NewsRetriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for NewsSearchTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "search_market_news".into(),
            description:
                "Retrieve the latest market news and headlines from the local knowledge base. \
                 Use this before answering any question about market conditions."
                    .into(),
            parameters: vec![
                ParameterSchema {
                    name: "query".into(),
                    param_type: "string".into(),
                    description: "Search keywords; concise entity terms work best \
                                  (e.g. 'bitcoin ETF', 'rate cut', 'ethereum upgrade')"
                        .into(),
                    required: true,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "top_k".into(),
                    param_type: "integer".into(),
                    description: "Number of snippets to return (default 3)".into(),
                    required: false,
                    enum_values: None,
                },
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let query = call.str_arg("query").unwrap_or_default();
        let top_k = call
            .int_arg("top_k")
            .and_then(|v| usize::try_from(v).ok())
            .unwrap_or(DEFAULT_TOP_K)
            .clamp(1, MAX_TOP_K);

        let hits = match self.retriever.search(query, top_k).await {
            Ok(hits) => hits,
            Err(e) => return Ok(ToolResult::failure("search_market_news", e.to_string())),
        };

        if !hits.store_available {
            return Ok(ToolResult::failure(
                "search_market_news",
                "The local knowledge store is not available; no news context can be retrieved.",
            ));
        }

        if hits.items.is_empty() {
            return Ok(ToolResult::success(
                "search_market_news",
                format!("No relevant news found for '{query}'."),
            ));
        }

        let rendered = hits
            .items
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ToolResult::success("search_market_news", rendered))
    }
}
