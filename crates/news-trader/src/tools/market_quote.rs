//! Market Quote Tool
//!
//! Fetches the current price and 24h change for a trading pair.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

use crate::market::MarketData;
use crate::model::SymbolPair;

/// Tool for looking up a live market quote
pub struct MarketQuoteTool {
    market: Arc<dyn MarketData>,
}

impl MarketQuoteTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for MarketQuoteTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_market_quote".into(),
            description: "Get the current price and 24h percentage change for a trading pair."
                .into(),
            parameters: vec![ParameterSchema {
                name: "symbol".into(),
                param_type: "string".into(),
                description: "Trading pair in BASE/QUOTE form (e.g. 'BTC/USDT')".into(),
                required: true,
                enum_values: None,
            }],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let symbol = call.str_arg("symbol").unwrap_or_default();

        let pair: SymbolPair = match symbol.parse() {
            Ok(pair) => pair,
            Err(e) => return Ok(ToolResult::failure("get_market_quote", e.to_string())),
        };

        match self.market.get_quote(&pair).await {
            Ok(quote) => Ok(ToolResult::success(
                "get_market_quote",
                format!(
                    "{}: {} {} ({:+}% 24h)",
                    pair,
                    quote.price,
                    pair.quote(),
                    quote.pct_change_24h
                ),
            )),
            // Missing data must reach the model as text, not abort the cycle.
            Err(e) => Ok(ToolResult::failure("get_market_quote", e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockMarketData;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn call_with_symbol(symbol: &str) -> ToolCall {
        ToolCall::new(
            "get_market_quote",
            HashMap::from([("symbol".to_string(), serde_json::json!(symbol))]),
        )
    }

    #[tokio::test]
    async fn test_quote_rendering() {
        let market = Arc::new(MockMarketData::new());
        market.set_price("BTC", dec!(50000));
        let tool = MarketQuoteTool::new(market);

        let result = tool.execute(&call_with_symbol("BTC/USDT")).await.unwrap();
        assert!(result.success);
        assert!(result.output.contains("BTC/USDT"));
        assert!(result.output.contains("50000"));
    }

    #[tokio::test]
    async fn test_unlisted_symbol_is_error_text() {
        let tool = MarketQuoteTool::new(Arc::new(MockMarketData::new()));

        let result = tool.execute(&call_with_symbol("NOPE/USDT")).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("quote unavailable"));
    }

    #[tokio::test]
    async fn test_malformed_symbol_is_error_text() {
        let tool = MarketQuoteTool::new(Arc::new(MockMarketData::new()));

        let result = tool.execute(&call_with_symbol("BTCUSDT")).await.unwrap();
        assert!(!result.success);
        assert!(result.output.contains("invalid symbol"));
    }
}
