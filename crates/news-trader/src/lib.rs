//! # news-trader
//!
//! News-aware paper-trading assistant. Retrieves domain-relevant news
//! from a local semantic store, fetches live market quotes, asks a
//! language model to reason over both, and applies the resulting
//! structured decision to a persistent virtual portfolio.
//!
//! ## Flow of one execution cycle
//!
//! ```text
//! ┌────────────┐   quote/news tools   ┌──────────────┐
//! │ Trading    │─────────────────────▶│ Two-round    │
//! │ Agent      │◀─────────────────────│ Engine       │
//! └─────┬──────┘   strict JSON out    └──────────────┘
//!       │ Decision
//! ┌─────▼──────┐  fresh price  ┌──────────────┐
//! │ Trade      │──────────────▶│ Market Data  │
//! │ Executor   │               └──────────────┘
//! └─────┬──────┘
//!       │ load / mutate / save (atomic)
//! ┌─────▼──────┐
//! │ Portfolio  │  paper_portfolio.json
//! │ Store      │
//! └────────────┘
//! ```
//!
//! No real funds ever move; the ledger is a simulation.

pub mod agent;
pub mod config;
pub mod error;
pub mod executor;
pub mod market;
pub mod model;
pub mod news;
pub mod notify;
pub mod report;
pub mod runner;
pub mod store;
pub mod tools;

pub use agent::TradingAgent;
pub use config::TraderConfig;
pub use error::{Result, TraderError};
pub use executor::{TradeExecutor, TradeOutcome};
pub use model::{Decision, Portfolio, SymbolPair, TradeAction};
pub use store::PortfolioStore;
