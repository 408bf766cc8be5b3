//! Batch Runner
//!
//! Runs one decision-and-execution cycle per configured symbol,
//! sequentially. Each symbol's cycle is isolated: a fatal error (bad
//! decision format, provider failure, storage failure) is caught and
//! reported, and the batch continues with the next symbol. Business
//! rejections are ordinary outcomes, not errors.

use std::sync::Arc;

use crate::agent::TradingAgent;
use crate::error::TraderError;
use crate::executor::{TradeExecutor, TradeOutcome};
use crate::model::SymbolPair;
use crate::store::PortfolioStore;

/// What happened to one symbol in a batch
#[derive(Debug)]
pub enum CycleReport {
    /// Decision executed (or held)
    Executed {
        symbol: SymbolPair,
        action: String,
        outcome: TradeOutcome,
    },
    /// Business rule rejected the trade; portfolio untouched
    Rejected {
        symbol: SymbolPair,
        reason: String,
    },
    /// The cycle failed outright; portfolio untouched
    Failed {
        symbol: SymbolPair,
        error: TraderError,
    },
}

/// Run the full batch, one isolated cycle per symbol.
pub async fn run_batch(
    agent: &TradingAgent,
    executor: &TradeExecutor,
    store: &Arc<PortfolioStore>,
    symbols: &[SymbolPair],
) -> Vec<CycleReport> {
    let mut reports = Vec::with_capacity(symbols.len());

    for symbol in symbols {
        tracing::info!(symbol = %symbol, "starting evaluation cycle");
        reports.push(run_cycle(agent, executor, store, symbol).await);
    }

    reports
}

async fn run_cycle(
    agent: &TradingAgent,
    executor: &TradeExecutor,
    store: &Arc<PortfolioStore>,
    symbol: &SymbolPair,
) -> CycleReport {
    // Fresh read every cycle so this cycle observes earlier commits.
    let portfolio = match store.load().await {
        Ok(portfolio) => portfolio,
        Err(error) => {
            return CycleReport::Failed {
                symbol: symbol.clone(),
                error,
            };
        }
    };

    let decision = match agent.decide(symbol, &portfolio).await {
        Ok(decision) => decision,
        Err(error) => {
            if let TraderError::InvalidDecisionFormat { detail, raw } = &error {
                tracing::error!(
                    symbol = %symbol,
                    detail = %detail,
                    raw = %raw,
                    "model output failed validation"
                );
            }
            return CycleReport::Failed {
                symbol: symbol.clone(),
                error,
            };
        }
    };

    match executor.execute(&decision).await {
        Ok(outcome) => CycleReport::Executed {
            symbol: symbol.clone(),
            action: decision.action.to_string(),
            outcome,
        },
        Err(error) if error.is_business_rejection() => CycleReport::Rejected {
            symbol: symbol.clone(),
            reason: error.to_string(),
        },
        Err(error) => CycleReport::Failed {
            symbol: symbol.clone(),
            error,
        },
    }
}

impl CycleReport {
    /// One-line summary for the operator
    pub fn summary(&self) -> String {
        match self {
            CycleReport::Executed {
                symbol,
                action,
                outcome,
            } => match outcome {
                TradeOutcome::Held => format!("{symbol}: HOLD"),
                TradeOutcome::Bought { quantity, price } => {
                    format!("{symbol}: BUY {} @ {price}", quantity.normalize())
                }
                TradeOutcome::Sold {
                    quantity,
                    price,
                    clamped,
                    ..
                } => format!(
                    "{symbol}: {action} {} @ {price}{}",
                    quantity.normalize(),
                    if *clamped { " (clamped to holding)" } else { "" }
                ),
            },
            CycleReport::Rejected { symbol, reason } => format!("{symbol}: rejected - {reason}"),
            CycleReport::Failed { symbol, error } => format!("{symbol}: failed - {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockMarketData;
    use crate::notify::LogNotifier;
    use agent_core::provider::{
        ChatProvider, ChatRequest, Completion, FinishReason, GenerationOptions,
    };
    use agent_core::{Engine, Result as CoreResult, ToolRegistry};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider that answers with one canned text per call, in order.
    struct QueueProvider {
        answers: Mutex<VecDeque<String>>,
    }

    impl QueueProvider {
        fn new(answers: &[&str]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().map(|s| (*s).to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for QueueProvider {
        async fn complete(&self, _request: ChatRequest<'_>) -> CoreResult<Completion> {
            let content = self
                .answers
                .lock()
                .unwrap()
                .pop_front()
                .expect("no canned answer left");
            Ok(Completion {
                content,
                tool_calls: Vec::new(),
                model: "queued".into(),
                usage: None,
                finish_reason: Some(FinishReason::Stop),
            })
        }

        fn name(&self) -> &str {
            "queued"
        }
    }

    fn harness(answers: &[&str]) -> (TradingAgent, TradeExecutor, Arc<PortfolioStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PortfolioStore::new(
            dir.path().join("paper_portfolio.json"),
            dec!(10000),
        ));
        let market = Arc::new(MockMarketData::new());
        market.set_price("BTC", dec!(50000));
        market.set_price("ETH", dec!(2500));

        let engine = Engine::new(
            Arc::new(QueueProvider::new(answers)),
            Arc::new(ToolRegistry::new()),
            GenerationOptions::default(),
        );
        let agent = TradingAgent::new(engine);
        let executor = TradeExecutor::new(store.clone(), market, Arc::new(LogNotifier));

        (agent, executor, store, dir)
    }

    fn pairs(symbols: &[&str]) -> Vec<SymbolPair> {
        symbols.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_batch_continues_past_malformed_decision() {
        let (agent, executor, store, _dir) = harness(&[
            "this is not json",
            r#"{"symbol": "ETH/USDT", "action": "BUY", "amount_usdt": 1000, "reason": "ok"}"#,
        ]);

        let reports = run_batch(
            &agent,
            &executor,
            &store,
            &pairs(&["BTC/USDT", "ETH/USDT"]),
        )
        .await;

        assert_eq!(reports.len(), 2);
        assert!(matches!(
            &reports[0],
            CycleReport::Failed {
                error: TraderError::InvalidDecisionFormat { .. },
                ..
            }
        ));
        assert!(matches!(&reports[1], CycleReport::Executed { .. }));

        // The failed BTC cycle left the ledger untouched; ETH committed.
        let portfolio = store.load().await.unwrap();
        assert_eq!(portfolio.cash, dec!(9000));
        assert_eq!(portfolio.holding("ETH"), dec!(0.4));
        assert_eq!(portfolio.holding("BTC"), dec!(0));
    }

    #[tokio::test]
    async fn test_business_rejection_is_reported_not_failed() {
        let (agent, executor, store, _dir) = harness(&[
            r#"{"symbol": "BTC/USDT", "action": "SELL", "amount_usdt": 500, "reason": "exit"}"#,
        ]);

        let reports = run_batch(&agent, &executor, &store, &pairs(&["BTC/USDT"])).await;

        assert!(matches!(&reports[0], CycleReport::Rejected { .. }));
        assert!(reports[0].summary().contains("rejected"));

        let portfolio = store.load().await.unwrap();
        assert_eq!(portfolio.cash, dec!(10000));
    }

    #[tokio::test]
    async fn test_later_cycle_observes_earlier_commit() {
        let (agent, executor, store, _dir) = harness(&[
            r#"{"symbol": "BTC/USDT", "action": "BUY", "amount_usdt": 4000, "reason": "a"}"#,
            r#"{"symbol": "ETH/USDT", "action": "BUY", "amount_usdt": 4000, "reason": "b"}"#,
            r#"{"symbol": "BTC/USDT", "action": "BUY", "amount_usdt": 4000, "reason": "c"}"#,
        ]);

        let reports = run_batch(
            &agent,
            &executor,
            &store,
            &pairs(&["BTC/USDT", "ETH/USDT", "BTC/USDT"]),
        )
        .await;

        // 10000 - 4000 - 4000 leaves 2000: the third buy must be
        // rejected because it sees the committed state.
        assert!(matches!(&reports[0], CycleReport::Executed { .. }));
        assert!(matches!(&reports[1], CycleReport::Executed { .. }));
        assert!(matches!(&reports[2], CycleReport::Rejected { .. }));

        let portfolio = store.load().await.unwrap();
        assert_eq!(portfolio.cash, dec!(2000));
    }
}
