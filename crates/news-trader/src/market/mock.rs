//! Mock Market Data Client
//!
//! For testing and demo purposes. Returns prices from a fixed table that
//! tests can override per symbol.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::MarketData;
use crate::error::{Result, TraderError};
use crate::model::{Candle, Quote, SymbolPair};

/// Mock market data with static prices
pub struct MockMarketData {
    overrides: RwLock<HashMap<String, Decimal>>,
}

impl Default for MockMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            overrides: RwLock::new(HashMap::new()),
        }
    }

    /// Pin the price returned for a base asset
    pub fn set_price(&self, base: &str, price: Decimal) {
        self.overrides
            .write()
            .expect("price table poisoned")
            .insert(base.to_uppercase(), price);
    }

    fn base_price(&self, base: &str) -> Option<(Decimal, Decimal)> {
        if let Some(price) = self
            .overrides
            .read()
            .expect("price table poisoned")
            .get(base)
        {
            return Some((*price, Decimal::ZERO));
        }

        // (price, 24h change)
        match base {
            "BTC" => Some((dec!(97500), dec!(2.5))),
            "ETH" => Some((dec!(3450), dec!(1.8))),
            "SOL" => Some((dec!(195), dec!(4.2))),
            "ADA" => Some((dec!(0.95), dec!(-1.2))),
            "DOGE" => Some((dec!(0.38), dec!(12.0))),
            _ => None,
        }
    }
}

#[async_trait]
impl MarketData for MockMarketData {
    async fn get_quote(&self, pair: &SymbolPair) -> Result<Quote> {
        let (price, pct_change_24h) =
            self.base_price(pair.base())
                .ok_or_else(|| TraderError::QuoteUnavailable {
                    symbol: pair.to_string(),
                    reason: "symbol not listed".into(),
                })?;

        Ok(Quote {
            price,
            pct_change_24h,
        })
    }

    async fn get_candles(
        &self,
        pair: &SymbolPair,
        _interval: &str,
        limit: u16,
    ) -> Result<Vec<Candle>> {
        let quote = self.get_quote(pair).await?;
        let start = Utc::now() - Duration::hours(i64::from(limit));

        Ok((0..limit)
            .map(|i| Candle {
                open_time: start + Duration::hours(i64::from(i)),
                open: quote.price,
                high: quote.price,
                low: quote.price,
                close: quote.price,
                volume: dec!(100),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "MockMarket"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_quote() {
        let market = MockMarketData::new();
        let pair: SymbolPair = "BTC/USDT".parse().unwrap();

        let quote = market.get_quote(&pair).await.unwrap();
        assert!(quote.price > Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_price_override() {
        let market = MockMarketData::new();
        market.set_price("BTC", dec!(50000));
        let pair: SymbolPair = "BTC/USDT".parse().unwrap();

        let quote = market.get_quote(&pair).await.unwrap();
        assert_eq!(quote.price, dec!(50000));
    }

    #[tokio::test]
    async fn test_unlisted_symbol() {
        let market = MockMarketData::new();
        let pair: SymbolPair = "NOTREAL/USDT".parse().unwrap();

        assert!(matches!(
            market.get_quote(&pair).await,
            Err(TraderError::QuoteUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_candles_oldest_first() {
        let market = MockMarketData::new();
        let pair: SymbolPair = "BTC/USDT".parse().unwrap();

        let candles = market.get_candles(&pair, "1h", 5).await.unwrap();
        assert_eq!(candles.len(), 5);
        assert!(candles[0].open_time < candles[4].open_time);
    }
}
