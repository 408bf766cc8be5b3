//! Configuration
//!
//! All runtime knobs are collected once at process start from the
//! environment into an explicit config object; components receive only
//! the handles they need.

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{Result, TraderError};
use crate::model::SymbolPair;

/// Starting cash endowment for a fresh paper portfolio
pub const DEFAULT_INITIAL_CASH: Decimal = dec!(10000);

/// Trading-side configuration
#[derive(Clone, Debug)]
pub struct TraderConfig {
    /// Path of the persisted portfolio JSON
    pub portfolio_path: PathBuf,

    /// Cash endowment used on first initialization
    pub initial_cash: Decimal,

    /// Symbols evaluated by the batch command
    pub symbols: Vec<SymbolPair>,

    /// Model identifier passed to the provider
    pub model: String,

    /// Optional webhook for trade notifications
    pub notify_webhook_url: Option<String>,
}

impl TraderConfig {
    pub fn from_env() -> Result<Self> {
        let portfolio_path = std::env::var("PORTFOLIO_PATH")
            .unwrap_or_else(|_| "paper_portfolio.json".into())
            .into();

        let initial_cash = match std::env::var("INITIAL_CASH_USDT") {
            Ok(raw) => Decimal::from_str(&raw)
                .ok()
                .filter(|v| *v > Decimal::ZERO)
                .ok_or_else(|| {
                    TraderError::Config(format!("INITIAL_CASH_USDT is not a positive number: {raw}"))
                })?,
            Err(_) => DEFAULT_INITIAL_CASH,
        };

        let symbols = std::env::var("TRADE_SYMBOLS")
            .unwrap_or_else(|_| "BTC/USDT,ETH/USDT".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(SymbolPair::from_str)
            .collect::<Result<Vec<_>>>()?;

        if symbols.is_empty() {
            return Err(TraderError::Config("TRADE_SYMBOLS is empty".into()));
        }

        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".into());

        let notify_webhook_url = std::env::var("NOTIFY_WEBHOOK_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            portfolio_path,
            initial_cash,
            symbols,
            model,
            notify_webhook_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_list_parsing() {
        let symbols: Vec<SymbolPair> = "BTC/USDT, ETH/USDT"
            .split(',')
            .map(str::trim)
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[1].base(), "ETH");
    }

    #[test]
    fn test_default_initial_cash() {
        assert_eq!(DEFAULT_INITIAL_CASH, dec!(10000));
    }
}
