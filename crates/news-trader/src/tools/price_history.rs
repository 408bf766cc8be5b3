//! Price History Tool
//!
//! Fetches recent candle aggregates so the model can judge momentum
//! rather than a single point-in-time price.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{
    Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

use crate::market::MarketData;
use crate::model::SymbolPair;

const DEFAULT_LIMIT: u16 = 24;
const MAX_LIMIT: u16 = 168;

/// Tool for recent OHLCV history
pub struct PriceHistoryTool {
    market: Arc<dyn MarketData>,
}

impl PriceHistoryTool {
    pub fn new(market: Arc<dyn MarketData>) -> Self {
        Self { market }
    }
}

#[async_trait]
impl Tool for PriceHistoryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_price_history".into(),
            description: "Get recent hourly candles (open/high/low/close/volume) for a \
                          trading pair, oldest first."
                .into(),
            parameters: vec![
                ParameterSchema {
                    name: "symbol".into(),
                    param_type: "string".into(),
                    description: "Trading pair in BASE/QUOTE form (e.g. 'BTC/USDT')".into(),
                    required: true,
                    enum_values: None,
                },
                ParameterSchema {
                    name: "hours".into(),
                    param_type: "integer".into(),
                    description: "Number of hourly candles to return (default 24)".into(),
                    required: false,
                    enum_values: None,
                },
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let symbol = call.str_arg("symbol").unwrap_or_default();
        let limit = call
            .int_arg("hours")
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);

        let pair: SymbolPair = match symbol.parse() {
            Ok(pair) => pair,
            Err(e) => return Ok(ToolResult::failure("get_price_history", e.to_string())),
        };

        let candles = match self.market.get_candles(&pair, "1h", limit).await {
            Ok(candles) => candles,
            Err(e) => return Ok(ToolResult::failure("get_price_history", e.to_string())),
        };

        if candles.is_empty() {
            return Ok(ToolResult::failure(
                "get_price_history",
                format!("no candles available for {pair}"),
            ));
        }

        let mut output = format!("{pair} hourly candles, oldest first:\n");
        for candle in &candles {
            output.push_str(&format!(
                "{} O:{} H:{} L:{} C:{} V:{}\n",
                candle.open_time.format("%m-%d %H:%M"),
                candle.open,
                candle.high,
                candle.low,
                candle.close,
                candle.volume
            ));
        }

        Ok(ToolResult::success("get_price_history", output.trim_end()))
    }
}
