//! Trade Executor
//!
//! Applies a validated decision to the persistent paper portfolio. The
//! executor resolves a fresh market price (never reusing the engine's
//! context), converts the quote-currency amount into a base-asset
//! quantity, applies the slippage clamp on sells, and persists before
//! reporting success.
//!
//! Re-executing the same decision twice is a real double mutation;
//! callers invoke the executor at most once per cycle. The
//! load->mutate->save sequence must not interleave with another
//! executor invocation (sequential batch execution guarantees this
//! in-process).

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::error::{Result, TraderError};
use crate::market::MarketData;
use crate::model::{Decision, TradeAction};
use crate::notify::Notifier;
use crate::store::PortfolioStore;

/// Outcome of executing one decision
#[derive(Clone, Debug, PartialEq)]
pub enum TradeOutcome {
    /// HOLD, or a zero amount: nothing changed
    Held,

    /// Bought `quantity` base units at `price`
    Bought { quantity: Decimal, price: Decimal },

    /// Sold `quantity` base units at `price` for `proceeds` quote units.
    /// `clamped` is set when the requested quantity exceeded the holding
    /// and was reduced to it.
    Sold {
        quantity: Decimal,
        price: Decimal,
        proceeds: Decimal,
        clamped: bool,
    },
}

/// Applies decisions to the portfolio store
pub struct TradeExecutor {
    store: Arc<PortfolioStore>,
    market: Arc<dyn MarketData>,
    notifier: Arc<dyn Notifier>,
}

impl TradeExecutor {
    pub fn new(
        store: Arc<PortfolioStore>,
        market: Arc<dyn MarketData>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            market,
            notifier,
        }
    }

    /// Execute a decision against the current portfolio state.
    ///
    /// Business rejections (`InsufficientFunds`, `InsufficientHoldings`)
    /// and storage failures leave the persisted portfolio untouched; a
    /// storage failure after a successful business check is surfaced
    /// distinctly as `Storage`.
    pub async fn execute(&self, decision: &Decision) -> Result<TradeOutcome> {
        let pair = decision.pair()?;

        if decision.action == TradeAction::HOLD || decision.amount_usdt <= Decimal::ZERO {
            self.notifier
                .notify(&format!(
                    "[{}] HOLD - {}",
                    decision.symbol, decision.reason
                ))
                .await;
            return Ok(TradeOutcome::Held);
        }

        // Fresh price at execution time; the model's snapshot may be stale.
        let quote = self.market.get_quote(&pair).await?;
        if quote.price <= Decimal::ZERO {
            return Err(TraderError::QuoteUnavailable {
                symbol: pair.to_string(),
                reason: format!("non-positive price {}", quote.price),
            });
        }

        let mut portfolio = self.store.load().await?;

        let outcome = match decision.action {
            TradeAction::BUY => {
                if portfolio.cash < decision.amount_usdt {
                    let err = TraderError::InsufficientFunds {
                        requested: decision.amount_usdt,
                        cash: portfolio.cash,
                    };
                    self.notifier
                        .notify(&format!("[{}] rejected: {err}", decision.symbol))
                        .await;
                    return Err(err);
                }

                let quantity = decision.amount_usdt / quote.price;
                portfolio.cash -= decision.amount_usdt;
                portfolio.credit(pair.base(), quantity);

                TradeOutcome::Bought {
                    quantity,
                    price: quote.price,
                }
            }
            TradeAction::SELL => {
                let held = portfolio.holding(pair.base());
                let requested_qty = decision.amount_usdt / quote.price;

                // Slippage clamp BEFORE the insufficiency check: a sell
                // meant as "liquidate all" must succeed whenever
                // anything is held, even if the price moved since the
                // model's data snapshot. The realized proceeds are
                // re-derived from the clamped quantity at the current
                // price.
                let (quantity, clamped) = if requested_qty > held {
                    (held, true)
                } else {
                    (requested_qty, false)
                };

                if quantity <= Decimal::ZERO {
                    let err = TraderError::InsufficientHoldings {
                        asset: pair.base().to_string(),
                    };
                    self.notifier
                        .notify(&format!("[{}] rejected: {err}", decision.symbol))
                        .await;
                    return Err(err);
                }

                let proceeds = quantity * quote.price;
                portfolio.cash += proceeds;
                portfolio
                    .holdings
                    .insert(pair.base().to_string(), held - quantity);

                TradeOutcome::Sold {
                    quantity,
                    price: quote.price,
                    proceeds,
                    clamped,
                }
            }
            TradeAction::HOLD => unreachable!("handled above"),
        };

        // Persist before reporting success.
        self.store.save(&portfolio).await?;

        self.notifier.notify(&render_outcome(decision, &outcome)).await;
        tracing::info!(
            symbol = %decision.symbol,
            action = %decision.action,
            cash = %portfolio.cash,
            "trade committed"
        );

        Ok(outcome)
    }
}

fn render_outcome(decision: &Decision, outcome: &TradeOutcome) -> String {
    match outcome {
        TradeOutcome::Held => format!("[{}] HOLD - {}", decision.symbol, decision.reason),
        TradeOutcome::Bought { quantity, price } => format!(
            "[{}] BUY {} {} @ {} ({} USDT) - {}",
            decision.symbol,
            quantity.normalize(),
            base_of(&decision.symbol),
            price,
            decision.amount_usdt,
            decision.reason
        ),
        TradeOutcome::Sold {
            quantity,
            price,
            proceeds,
            clamped,
        } => format!(
            "[{}] SELL{} {} {} @ {} -> {} USDT - {}",
            decision.symbol,
            if *clamped { " (clamped)" } else { "" },
            quantity.normalize(),
            base_of(&decision.symbol),
            price,
            proceeds.normalize(),
            decision.reason
        ),
    }
}

fn base_of(symbol: &str) -> &str {
    symbol.split('/').next().unwrap_or(symbol)
}
