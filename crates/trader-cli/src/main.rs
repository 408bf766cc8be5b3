//! Trader CLI
//!
//! Three surfaces over the same core: an interactive analyst prompt
//! loop, a batch decision-and-execution run, and a standalone portfolio
//! valuation report.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{Engine, GenerationOptions, ToolRegistry};
use agent_runtime::OpenAiProvider;
use news_trader::{
    TraderConfig, TradingAgent, TradeExecutor,
    market::{BinanceMarketData, MarketData},
    news::HttpNewsRetriever,
    notify::{LogNotifier, Notifier, WebhookNotifier},
    report::value_portfolio,
    runner::run_batch,
    store::PortfolioStore,
    tools::{MarketQuoteTool, NewsSearchTool, PriceHistoryTool},
};

#[derive(Parser)]
#[command(name = "trader", about = "News-aware paper-trading assistant", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive analyst: free-text questions, narrative reports
    Chat,

    /// Evaluate the configured symbols once and execute the decisions
    Run,

    /// Value the paper portfolio at live prices
    Pnl,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = TraderConfig::from_env()?;

    let market: Arc<dyn MarketData> = Arc::new(BinanceMarketData::from_env()?);
    let store = Arc::new(PortfolioStore::new(
        config.portfolio_path.clone(),
        config.initial_cash,
    ));

    match cli.command {
        Commands::Chat => chat(&config, market).await,
        Commands::Run => run(&config, market, store).await,
        Commands::Pnl => pnl(market, &store).await,
    }
}

/// Wire provider + tools + engine into a trading agent
fn build_agent(config: &TraderConfig, market: Arc<dyn MarketData>) -> anyhow::Result<TradingAgent> {
    let provider = Arc::new(OpenAiProvider::from_env()?);

    let mut tools = ToolRegistry::new();
    tools.register(NewsSearchTool::new(Arc::new(HttpNewsRetriever::from_env()?)));
    tools.register(MarketQuoteTool::new(market.clone()));
    tools.register(PriceHistoryTool::new(market));

    tracing::info!("registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  - {name}");
    }

    let options = GenerationOptions {
        model: config.model.clone(),
        ..GenerationOptions::default()
    };

    Ok(TradingAgent::new(Engine::new(
        provider,
        Arc::new(tools),
        options,
    )))
}

fn build_notifier(config: &TraderConfig) -> anyhow::Result<Arc<dyn Notifier>> {
    Ok(match &config.notify_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone())?),
        None => Arc::new(LogNotifier),
    })
}

async fn chat(config: &TraderConfig, market: Arc<dyn MarketData>) -> anyhow::Result<()> {
    let agent = build_agent(config, market)?;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(b"Ask about a market, sector or asset ('q' to quit).\n")
        .await?;

    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.eq_ignore_ascii_case("q") {
            break;
        }
        if question.is_empty() {
            continue;
        }

        match agent.report(question).await {
            Ok(answer) => {
                stdout.write_all(b"\n").await?;
                stdout.write_all(answer.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            Err(e) => {
                tracing::error!(error = %e, "report failed");
                stdout
                    .write_all(format!("error: {e}\n").as_bytes())
                    .await?;
            }
        }
    }

    Ok(())
}

async fn run(
    config: &TraderConfig,
    market: Arc<dyn MarketData>,
    store: Arc<PortfolioStore>,
) -> anyhow::Result<()> {
    let agent = build_agent(config, market.clone())?;
    let notifier = build_notifier(config)?;
    let executor = TradeExecutor::new(store.clone(), market, notifier);

    let reports = run_batch(&agent, &executor, &store, &config.symbols).await;

    println!();
    for report in &reports {
        println!("{}", report.summary());
    }

    Ok(())
}

async fn pnl(market: Arc<dyn MarketData>, store: &Arc<PortfolioStore>) -> anyhow::Result<()> {
    let report = value_portfolio(store, market.as_ref(), "USDT").await?;
    println!("{}", report.render());
    Ok(())
}
