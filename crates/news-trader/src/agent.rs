//! Trading Agent
//!
//! One parameterized agent replaces the narrative-report and
//! strict-JSON-execution variants: both share the same two-round
//! orchestration and tool registry, and differ only in system prompt,
//! user message and output handling. Every evaluation starts a fresh
//! conversation; nothing carries over between symbols or questions.

use agent_core::{Conversation, Engine, Message};
use rust_decimal::Decimal;

use crate::error::{Result, TraderError};
use crate::model::{Decision, Portfolio, SymbolPair};

/// System prompt for the narrative analyst mode
pub const ANALYST_SYSTEM_PROMPT: &str = "\
You are a senior quantitative market analyst.

Working principles:
1. Facts first: before answering any market question, call the \
`search_market_news` tool to pull the latest headlines from the local \
knowledge base. Never invent news.
2. Go beyond repetition: analyze what each headline means for the asset, \
sector or macro picture, and lay out the reasoning chain.
3. Stay clinical: concise, professional, conclusion-first language. No \
hedging filler, no emotional wording.
4. Close every answer with the line: \
\"Markets are risky; this analysis is for paper-trading research only and \
is not investment advice.\"";

/// System prompt for the structured execution mode
pub const EXECUTION_SYSTEM_PROMPT: &str = "\
You are an automated crypto trading strategist managing a paper portfolio.

Use your tools to gather the latest news and the current market quote \
before deciding. Gather everything you need in one round of tool calls.

Then respond with a single JSON object and nothing else, with exactly \
these fields:
{\"symbol\": \"<BASE/QUOTE>\", \"action\": \"BUY\" | \"SELL\" | \"HOLD\", \
\"amount_usdt\": <number>, \"reason\": \"<one-sentence justification>\"}

Rules:
- action must be one of BUY, SELL, HOLD.
- amount_usdt is the trade size in USDT; use 0 for HOLD.
- Never propose a BUY larger than the available cash.
- Never propose a SELL when the holding is zero.
- No markdown, no commentary outside the JSON object.";

/// The news-aware trading agent
pub struct TradingAgent {
    engine: Engine,
}

impl TradingAgent {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    /// Narrative mode: free-text question in, analyst report out.
    pub async fn report(&self, question: &str) -> Result<String> {
        let mut conversation = Conversation::with_system_prompt(ANALYST_SYSTEM_PROMPT);
        conversation.push(Message::user(question));

        let output = self.engine.run_cycle(&mut conversation, false).await?;
        tracing::debug!(tool_rounds = output.tool_rounds, "report cycle complete");
        Ok(output.text)
    }

    /// Execution mode: evaluate one symbol against the current portfolio
    /// and return a validated decision.
    ///
    /// The user message states the cash balance and the base-asset
    /// holding so the model cannot hallucinate an impossible SELL. A
    /// final answer that fails the decision schema aborts this cycle
    /// with `InvalidDecisionFormat` and leaves the portfolio untouched.
    pub async fn decide(&self, pair: &SymbolPair, portfolio: &Portfolio) -> Result<Decision> {
        let mut conversation = Conversation::with_system_prompt(EXECUTION_SYSTEM_PROMPT);
        conversation.push(Message::user(Self::cycle_prompt(pair, portfolio)));

        let output = self.engine.run_cycle(&mut conversation, true).await?;
        tracing::debug!(
            symbol = %pair,
            tool_rounds = output.tool_rounds,
            "decision cycle complete"
        );

        let decision = Decision::parse(&output.text)?;
        if decision.pair()? != *pair {
            return Err(TraderError::InvalidDecisionFormat {
                detail: format!("decision names {}, expected {pair}", decision.symbol),
                raw: output.text,
            });
        }

        Ok(decision)
    }

    fn cycle_prompt(pair: &SymbolPair, portfolio: &Portfolio) -> String {
        format!(
            "Evaluate {pair} now and decide on a trade.\n\
             Current paper portfolio: cash {cash:.2} {quote}, holding {qty} {base}.",
            pair = pair,
            cash = portfolio.cash,
            quote = pair.quote(),
            qty = holding_display(portfolio.holding(pair.base())),
            base = pair.base(),
        )
    }
}

fn holding_display(qty: Decimal) -> String {
    qty.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::provider::{
        ChatProvider, ChatRequest, Completion, FinishReason, GenerationOptions,
    };
    use agent_core::{ToolRegistry, Result as CoreResult};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    /// Provider that always answers with the same text, recording the
    /// user prompts it saw.
    struct CannedProvider {
        answer: String,
        seen: std::sync::Mutex<Vec<String>>,
    }

    impl CannedProvider {
        fn new(answer: &str) -> Self {
            Self {
                answer: answer.into(),
                seen: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for CannedProvider {
        async fn complete(&self, request: ChatRequest<'_>) -> CoreResult<Completion> {
            let user = request
                .messages
                .iter()
                .find(|m| m.role == agent_core::Role::User)
                .map(|m| m.content.clone())
                .unwrap_or_default();
            self.seen.lock().unwrap().push(user);

            Ok(Completion {
                content: self.answer.clone(),
                tool_calls: Vec::new(),
                model: "canned".into(),
                usage: None,
                finish_reason: Some(FinishReason::Stop),
            })
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn agent_answering(answer: &str) -> (TradingAgent, Arc<CannedProvider>) {
        let provider = Arc::new(CannedProvider::new(answer));
        let engine = Engine::new(
            provider.clone(),
            Arc::new(ToolRegistry::new()),
            GenerationOptions::default(),
        );
        (TradingAgent::new(engine), provider)
    }

    #[tokio::test]
    async fn test_decide_parses_valid_decision() {
        let (agent, provider) = agent_answering(
            r#"{"symbol": "BTC/USDT", "action": "BUY", "amount_usdt": 500, "reason": "inflows"}"#,
        );
        let pair: SymbolPair = "BTC/USDT".parse().unwrap();
        let mut portfolio = Portfolio::with_cash(dec!(10000));
        portfolio.credit("BTC", dec!(0.5));

        let decision = agent.decide(&pair, &portfolio).await.unwrap();
        assert_eq!(decision.amount_usdt, dec!(500));

        // Portfolio context must reach the model.
        let prompt = provider.seen.lock().unwrap().join("\n");
        assert!(prompt.contains("cash 10000.00 USDT"));
        assert!(prompt.contains("holding 0.5 BTC"));
    }

    #[tokio::test]
    async fn test_decide_rejects_prose_answer() {
        let (agent, _) = agent_answering("Buying looks attractive here.");
        let pair: SymbolPair = "BTC/USDT".parse().unwrap();
        let portfolio = Portfolio::with_cash(dec!(10000));

        let err = agent.decide(&pair, &portfolio).await.unwrap_err();
        assert!(matches!(err, TraderError::InvalidDecisionFormat { .. }));
    }

    #[tokio::test]
    async fn test_decide_rejects_wrong_symbol() {
        let (agent, _) = agent_answering(
            r#"{"symbol": "ETH/USDT", "action": "HOLD", "amount_usdt": 0, "reason": "n/a"}"#,
        );
        let pair: SymbolPair = "BTC/USDT".parse().unwrap();
        let portfolio = Portfolio::with_cash(dec!(10000));

        let err = agent.decide(&pair, &portfolio).await.unwrap_err();
        assert!(matches!(err, TraderError::InvalidDecisionFormat { .. }));
    }

    #[tokio::test]
    async fn test_report_returns_text_verbatim() {
        let (agent, _) = agent_answering("Rates held; risk assets bid.");
        let text = agent.report("What moved the market today?").await.unwrap();
        assert_eq!(text, "Rates held; risk assets bid.");
    }
}
