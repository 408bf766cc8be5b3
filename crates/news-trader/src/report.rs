//! Portfolio Valuation Report
//!
//! Reads the ledger, queries a live price for every holding, and prints
//! per-asset value plus aggregate profit/loss versus the initial cash
//! endowment. A holding whose price cannot be fetched is shown as
//! unavailable and excluded from the total rather than failing the
//! report.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::Result;
use crate::market::MarketData;
use crate::model::SymbolPair;
use crate::store::PortfolioStore;

/// One holding's live valuation
#[derive(Clone, Debug)]
pub struct AssetValuation {
    pub asset: String,
    pub quantity: Decimal,
    /// None when the price fetch failed
    pub price: Option<Decimal>,
    pub value: Option<Decimal>,
}

/// Full portfolio valuation
#[derive(Clone, Debug)]
pub struct ValuationReport {
    pub cash: Decimal,
    pub lines: Vec<AssetValuation>,
    pub holdings_value: Decimal,
    pub total_value: Decimal,
    pub pnl: Decimal,
    pub pnl_pct: Decimal,
}

/// Value the persisted portfolio at live prices.
pub async fn value_portfolio(
    store: &PortfolioStore,
    market: &dyn MarketData,
    quote_currency: &str,
) -> Result<ValuationReport> {
    let portfolio = store.load().await?;

    let mut lines = Vec::new();
    let mut holdings_value = Decimal::ZERO;

    for (asset, quantity) in portfolio.held_assets() {
        let pair: SymbolPair = format!("{asset}/{quote_currency}").parse()?;
        match market.get_quote(&pair).await {
            Ok(quote) => {
                let value = quantity * quote.price;
                holdings_value += value;
                lines.push(AssetValuation {
                    asset: asset.to_string(),
                    quantity,
                    price: Some(quote.price),
                    value: Some(value),
                });
            }
            Err(e) => {
                tracing::warn!(asset, error = %e, "price unavailable for valuation");
                lines.push(AssetValuation {
                    asset: asset.to_string(),
                    quantity,
                    price: None,
                    value: None,
                });
            }
        }
    }

    let total_value = portfolio.cash + holdings_value;
    let initial = store.initial_cash();
    let pnl = total_value - initial;
    let pnl_pct = if initial > Decimal::ZERO {
        (pnl / initial) * dec!(100)
    } else {
        Decimal::ZERO
    };

    Ok(ValuationReport {
        cash: portfolio.cash,
        lines,
        holdings_value,
        total_value,
        pnl,
        pnl_pct,
    })
}

impl ValuationReport {
    /// Render the human-readable dashboard
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&"=".repeat(55));
        out.push_str("\nPAPER PORTFOLIO VALUATION\n");
        out.push_str(&"=".repeat(55));
        out.push('\n');

        out.push_str(&format!("Available cash: {:.2} USDT\n", self.cash));

        if self.lines.is_empty() {
            out.push_str("No holdings. Waiting for trading signals.\n");
        } else {
            out.push_str(&format!(
                "{:<8} {:>14} {:>14} {:>14}\n",
                "ASSET", "AMOUNT", "LIVE PRICE", "VALUE"
            ));
            out.push_str(&"-".repeat(55));
            out.push('\n');

            for line in &self.lines {
                match (line.price, line.value) {
                    (Some(price), Some(value)) => {
                        out.push_str(&format!(
                            "{:<8} {:>14} {:>14.2} {:>14.2}\n",
                            line.asset,
                            line.quantity.normalize(),
                            price,
                            value
                        ));
                    }
                    _ => {
                        out.push_str(&format!(
                            "{:<8} {:>14} {:>14} {:>14}\n",
                            line.asset,
                            line.quantity.normalize(),
                            "unavailable",
                            "-"
                        ));
                    }
                }
            }
            out.push_str(&"-".repeat(55));
            out.push('\n');
        }

        out.push_str(&format!("Holdings value: {:.2} USDT\n", self.holdings_value));
        out.push_str(&format!("Total value:    {:.2} USDT\n", self.total_value));
        out.push_str(&format!(
            "All-time PnL:   {}{:.2} USDT ({}{:.2}%)\n",
            sign(self.pnl),
            self.pnl.abs(),
            sign(self.pnl),
            self.pnl_pct.abs()
        ));

        out
    }
}

fn sign(value: Decimal) -> &'static str {
    if value >= Decimal::ZERO { "+" } else { "-" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockMarketData;
    use crate::model::Portfolio;

    #[tokio::test]
    async fn test_valuation_totals() {
        let dir = tempfile::tempdir().unwrap();
        let store = PortfolioStore::new(dir.path().join("p.json"), dec!(10000));
        let market = MockMarketData::new();
        market.set_price("BTC", dec!(50000));

        let mut portfolio = Portfolio::with_cash(dec!(9000));
        portfolio.credit("BTC", dec!(0.02));
        store.save(&portfolio).await.unwrap();

        let report = value_portfolio(&store, &market, "USDT").await.unwrap();
        assert_eq!(report.cash, dec!(9000));
        assert_eq!(report.holdings_value, dec!(1000));
        assert_eq!(report.total_value, dec!(10000));
        assert_eq!(report.pnl, dec!(0));
    }

    #[tokio::test]
    async fn test_unavailable_price_does_not_fail_report() {
        let dir = tempfile::tempdir().unwrap();
        let store = PortfolioStore::new(dir.path().join("p.json"), dec!(10000));
        let market = MockMarketData::new();
        market.set_price("BTC", dec!(50000));

        let mut portfolio = Portfolio::with_cash(dec!(1000));
        portfolio.credit("BTC", dec!(0.1));
        portfolio.credit("DELISTED", dec!(5));
        store.save(&portfolio).await.unwrap();

        let report = value_portfolio(&store, &market, "USDT").await.unwrap();
        assert_eq!(report.lines.len(), 2);
        assert_eq!(report.holdings_value, dec!(5000));

        let broken = report
            .lines
            .iter()
            .find(|l| l.asset == "DELISTED")
            .unwrap();
        assert!(broken.price.is_none());
        assert!(report.render().contains("unavailable"));
    }

    #[tokio::test]
    async fn test_zero_holdings_render() {
        let dir = tempfile::tempdir().unwrap();
        let store = PortfolioStore::new(dir.path().join("p.json"), dec!(10000));
        let market = MockMarketData::new();

        let report = value_portfolio(&store, &market, "USDT").await.unwrap();
        assert!(report.lines.is_empty());
        assert!(report.render().contains("No holdings"));
    }
}
