//! Market Data
//!
//! Abstractions and implementations for market-data venues. Adapters are
//! pure query wrappers: no caching, every call is a fresh network fetch.

mod binance;
mod mock;

pub use binance::BinanceMarketData;
pub use mock::MockMarketData;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Candle, Quote, SymbolPair};

/// Market data client trait (Strategy pattern)
///
/// Failures surface as `QuoteUnavailable` and must be treated as
/// non-fatal by callers inside a cycle: the tool layer converts them to
/// error text the model can reason around.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Current price and 24h change for a pair
    async fn get_quote(&self, pair: &SymbolPair) -> Result<Quote>;

    /// Historical candles, oldest first
    async fn get_candles(&self, pair: &SymbolPair, interval: &str, limit: u16)
        -> Result<Vec<Candle>>;

    /// Venue name
    fn name(&self) -> &str;
}
