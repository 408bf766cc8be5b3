//! Error Types for the Trading Domain
//!
//! The taxonomy separates failures by how far they may propagate:
//! quote/news failures are recovered inside the tool boundary, decision
//! and storage failures abort one cycle, business rejections are
//! reported outcomes.

use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TraderError>;

#[derive(Error, Debug)]
pub enum TraderError {
    #[error("quote unavailable for {symbol}: {reason}")]
    QuoteUnavailable { symbol: String, reason: String },

    #[error("news retrieval failed: {0}")]
    NewsUnavailable(String),

    #[error("invalid decision format: {detail}")]
    InvalidDecisionFormat { detail: String, raw: String },

    #[error("insufficient funds: requested {requested} USDT, cash {cash} USDT")]
    InsufficientFunds { requested: Decimal, cash: Decimal },

    #[error("insufficient holdings: no {asset} to sell")]
    InsufficientHoldings { asset: String },

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("portfolio storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Agent(#[from] agent_core::AgentError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TraderError {
    /// Business rejections leave the portfolio untouched and are
    /// reported rather than treated as cycle failures.
    pub fn is_business_rejection(&self) -> bool {
        matches!(
            self,
            TraderError::InsufficientFunds { .. } | TraderError::InsufficientHoldings { .. }
        )
    }
}
