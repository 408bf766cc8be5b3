//! Binance Market Data Client
//!
//! REST client for the Binance spot API (`/api/v3`). Works against any
//! Binance-compatible venue by overriding the base URL.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::MarketData;
use crate::error::{Result, TraderError};
use crate::model::{Candle, Quote, SymbolPair};

const DEFAULT_BASE_URL: &str = "https://api.binance.us";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Binance REST market-data adapter
pub struct BinanceMarketData {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceMarketData {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TraderError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("BINANCE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Self::new(base_url)
    }

    fn unavailable(pair: &SymbolPair, reason: impl std::fmt::Display) -> TraderError {
        TraderError::QuoteUnavailable {
            symbol: pair.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// `/api/v3/ticker/24hr` response, string-encoded numbers as the venue
/// transmits them
#[derive(Deserialize)]
struct Ticker24h {
    #[serde(rename = "lastPrice", with = "rust_decimal::serde::str")]
    last_price: Decimal,
    #[serde(rename = "priceChangePercent", with = "rust_decimal::serde::str")]
    price_change_percent: Decimal,
}

#[async_trait]
impl MarketData for BinanceMarketData {
    async fn get_quote(&self, pair: &SymbolPair) -> Result<Quote> {
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", pair.exchange_symbol())])
            .send()
            .await
            .map_err(|e| Self::unavailable(pair, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::unavailable(pair, format!("HTTP {status}")));
        }

        let ticker: Ticker24h = response
            .json()
            .await
            .map_err(|e| Self::unavailable(pair, format!("malformed ticker: {e}")))?;

        Ok(Quote {
            price: ticker.last_price,
            pct_change_24h: ticker.price_change_percent,
        })
    }

    async fn get_candles(
        &self,
        pair: &SymbolPair,
        interval: &str,
        limit: u16,
    ) -> Result<Vec<Candle>> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", pair.exchange_symbol()),
                ("interval", interval.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Self::unavailable(pair, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::unavailable(pair, format!("HTTP {status}")));
        }

        // Klines arrive as positional arrays:
        // [open_time, open, high, low, close, volume, close_time, ...]
        let rows: Vec<Vec<serde_json::Value>> = response
            .json()
            .await
            .map_err(|e| Self::unavailable(pair, format!("malformed klines: {e}")))?;

        rows.iter()
            .map(|row| parse_kline(row).ok_or_else(|| Self::unavailable(pair, "malformed kline row")))
            .collect()
    }

    fn name(&self) -> &str {
        "Binance"
    }
}

fn parse_kline(row: &[serde_json::Value]) -> Option<Candle> {
    let open_time = DateTime::<Utc>::from_timestamp_millis(row.first()?.as_i64()?)?;
    let field = |i: usize| -> Option<Decimal> { Decimal::from_str(row.get(i)?.as_str()?).ok() };

    Some(Candle {
        open_time,
        open: field(1)?,
        high: field(2)?,
        low: field(3)?,
        close: field(4)?,
        volume: field(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ticker_deserialization() {
        let ticker: Ticker24h = serde_json::from_value(serde_json::json!({
            "symbol": "BTCUSDT",
            "lastPrice": "97500.00",
            "priceChangePercent": "2.500",
        }))
        .unwrap();
        assert_eq!(ticker.last_price, dec!(97500.00));
        assert_eq!(ticker.price_change_percent, dec!(2.500));
    }

    #[test]
    fn test_kline_parsing() {
        let row: Vec<serde_json::Value> = serde_json::from_value(serde_json::json!([
            1700000000000i64,
            "40000.0",
            "41000.0",
            "39500.0",
            "40800.0",
            "123.456",
            1700003599999i64,
        ]))
        .unwrap();

        let candle = parse_kline(&row).unwrap();
        assert_eq!(candle.open, dec!(40000.0));
        assert_eq!(candle.close, dec!(40800.0));
        assert_eq!(candle.volume, dec!(123.456));
    }

    #[test]
    fn test_kline_parsing_rejects_short_row() {
        let row: Vec<serde_json::Value> =
            serde_json::from_value(serde_json::json!([1700000000000i64, "40000.0"])).unwrap();
        assert!(parse_kline(&row).is_none());
    }
}
