//! Domain Models
//!
//! Core data types for the paper-trading ledger and the model's decision
//! contract. Uses `rust_decimal` for all monetary values - never use f64
//! for money!

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TraderError;

/// A trading pair, `BASE/QUOTE` (e.g. `BTC/USDT`)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolPair {
    base: String,
    quote: String,
}

impl SymbolPair {
    /// Base asset (the asset being priced)
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote currency (what the asset is priced in)
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Venue symbol without the separator (e.g. `BTCUSDT`)
    pub fn exchange_symbol(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl FromStr for SymbolPair {
    type Err = TraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s
            .split_once('/')
            .ok_or_else(|| TraderError::InvalidSymbol(s.to_string()))?;
        let base = base.trim().to_uppercase();
        let quote = quote.trim().to_uppercase();
        if base.is_empty() || quote.is_empty() {
            return Err(TraderError::InvalidSymbol(s.to_string()));
        }
        Ok(Self { base, quote })
    }
}

impl std::fmt::Display for SymbolPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// A current market quote
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quote {
    /// Last traded price in quote currency
    pub price: Decimal,

    /// 24-hour price change percentage
    pub pct_change_24h: Decimal,
}

/// One OHLCV candle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// The virtual ledger: available cash plus per-asset holdings.
///
/// Persisted as a single human-inspectable JSON document with the cash
/// under its currency key:
/// `{ "USDT": 10000.0, "holdings": { "BTC": 0.02 } }`
///
/// Invariants: cash >= 0 and every holding quantity >= 0 after a
/// committed operation. Mutated exclusively by the trade executor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Available cash in quote currency
    #[serde(rename = "USDT", with = "rust_decimal::serde::float")]
    pub cash: Decimal,

    /// Base-asset symbol -> quantity held
    #[serde(with = "holdings_float")]
    pub holdings: BTreeMap<String, Decimal>,
}

impl Portfolio {
    /// Fresh portfolio with the given cash endowment
    pub fn with_cash(cash: Decimal) -> Self {
        Self {
            cash,
            holdings: BTreeMap::new(),
        }
    }

    /// Quantity held of an asset (zero when absent)
    pub fn holding(&self, asset: &str) -> Decimal {
        self.holdings.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Credit a base-asset holding
    pub fn credit(&mut self, asset: &str, quantity: Decimal) {
        *self
            .holdings
            .entry(asset.to_string())
            .or_insert(Decimal::ZERO) += quantity;
    }

    /// Assets with a non-zero quantity
    pub fn held_assets(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.holdings
            .iter()
            .filter(|(_, qty)| **qty > Decimal::ZERO)
            .map(|(asset, qty)| (asset.as_str(), *qty))
    }
}

/// Serialize holding quantities as plain JSON floats
mod holdings_float {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;
    use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        holdings: &BTreeMap<String, Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let as_float: BTreeMap<&str, f64> = holdings
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_f64().unwrap_or(0.0)))
            .collect();
        as_float.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Decimal>, D::Error> {
        let as_float = BTreeMap::<String, f64>::deserialize(deserializer)?;
        as_float
            .into_iter()
            .map(|(k, v)| {
                Decimal::from_f64(v)
                    .ok_or_else(|| serde::de::Error::custom(format!("bad quantity for {k}: {v}")))
                    .map(|d| (k, d.normalize()))
            })
            .collect()
    }
}

/// Trade direction tokens the model may emit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    BUY,
    SELL,
    HOLD,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::BUY => write!(f, "BUY"),
            TradeAction::SELL => write!(f, "SELL"),
            TradeAction::HOLD => write!(f, "HOLD"),
        }
    }
}

/// The model's structured trade decision.
///
/// Exactly these four fields; anything extra or missing is a format
/// error. Consumed once per cycle by the trade executor and never
/// persisted on its own.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Decision {
    /// Trading pair, `BASE/QUOTE`
    pub symbol: String,

    /// BUY, SELL or HOLD
    pub action: TradeAction,

    /// Trade size in quote currency
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_usdt: Decimal,

    /// The model's justification
    pub reason: String,
}

impl Decision {
    /// Parse and validate a model's final answer as a decision object.
    ///
    /// Tolerates a fenced ```json block around the object; everything
    /// else is strict. The raw text rides along in the error for
    /// diagnostics.
    pub fn parse(text: &str) -> Result<Self, TraderError> {
        let stripped = strip_code_fence(text);

        let decision: Decision =
            serde_json::from_str(stripped).map_err(|e| TraderError::InvalidDecisionFormat {
                detail: e.to_string(),
                raw: text.to_string(),
            })?;

        if decision.amount_usdt < Decimal::ZERO {
            return Err(TraderError::InvalidDecisionFormat {
                detail: format!("amount_usdt must be non-negative, got {}", decision.amount_usdt),
                raw: text.to_string(),
            });
        }

        Ok(decision)
    }

    /// The decision's trading pair
    pub fn pair(&self) -> Result<SymbolPair, TraderError> {
        self.symbol.parse()
    }
}

/// Strip a surrounding markdown code fence, if any
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
