//! Two-Round Engine
//!
//! Drives one evaluation cycle: a tool-discovery round, at most one tool
//! execution pass, then a final-answer round. The fixed two-round
//! protocol bounds cost and latency versus an open-ended agent loop, at
//! the price of forcing the model to gather all needed context in one
//! shot — a deliberate trade-off, not an oversight.

use std::sync::Arc;

use crate::error::Result;
use crate::message::{Conversation, Message};
use crate::provider::{ChatProvider, ChatRequest, GenerationOptions, ToolChoice};
use crate::tool::ToolRegistry;

/// Output of one engine cycle
#[derive(Clone, Debug)]
pub struct CycleOutput {
    /// Final answer text, verbatim from the model
    pub text: String,

    /// Number of tool-execution rounds performed (0 or 1)
    pub tool_rounds: usize,
}

/// The orchestration core: provider + tools + generation options,
/// constructed once at process start.
pub struct Engine {
    provider: Arc<dyn ChatProvider>,
    tools: Arc<ToolRegistry>,
    options: GenerationOptions,
}

impl Engine {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        tools: Arc<ToolRegistry>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            provider,
            tools,
            options,
        }
    }

    /// Run one cycle over the given conversation.
    ///
    /// Round one offers the registered tools with automatic tool choice.
    /// If the model requests tool calls, each call is dispatched in the
    /// order received (failures fold into error-text results), the
    /// conversation is extended with one tool message per call, and a
    /// single second round produces the final answer. A second round that
    /// requests tools again is NOT recursed into: its textual content is
    /// taken verbatim.
    ///
    /// When `json_final` is set, the answer round enforces a JSON-object
    /// response. Round one is only JSON-constrained if no tools are
    /// offered, since tool choice and JSON enforcement are mutually
    /// exclusive on some backends.
    pub async fn run_cycle(
        &self,
        conversation: &mut Conversation,
        json_final: bool,
    ) -> Result<CycleOutput> {
        let schemas = self.tools.schemas();

        let first = self
            .provider
            .complete(ChatRequest {
                messages: conversation.messages(),
                tools: &schemas,
                tool_choice: if schemas.is_empty() {
                    ToolChoice::None
                } else {
                    ToolChoice::Auto
                },
                json_object: json_final && schemas.is_empty(),
                options: &self.options,
            })
            .await?;

        if !first.wants_tools() {
            conversation.push(Message::assistant(&first.content));
            return Ok(CycleOutput {
                text: first.content,
                tool_rounds: 0,
            });
        }

        conversation.push(Message::assistant_tool_calls(
            &first.content,
            first.tool_calls.clone(),
        ));

        for call in &first.tool_calls {
            tracing::debug!(tool = %call.name, "executing tool call");
            let result = self.tools.dispatch(call).await;
            conversation.push(Message::tool(result.output, result.id));
        }

        let second = self
            .provider
            .complete(ChatRequest {
                messages: conversation.messages(),
                tools: &[],
                tool_choice: ToolChoice::None,
                json_object: json_final,
                options: &self.options,
            })
            .await?;

        if second.wants_tools() {
            tracing::warn!("model requested tools on the answer round; taking text verbatim");
        }

        conversation.push(Message::assistant(&second.content));
        Ok(CycleOutput {
            text: second.content,
            tool_rounds: 1,
        })
    }

    /// Generation options in use
    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    /// The tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }
}
