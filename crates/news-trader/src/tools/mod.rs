//! Agent Tools
//!
//! Tools exposed to the language model. Each wraps one external adapter
//! and renders its output (or its error) as text for the conversation.

mod market_quote;
mod news_search;
mod price_history;

pub use market_quote::MarketQuoteTool;
pub use news_search::NewsSearchTool;
pub use price_history::PriceHistoryTool;
