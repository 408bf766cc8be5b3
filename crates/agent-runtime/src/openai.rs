//! OpenAI Chat-Completions Provider
//!
//! Implementation of `ChatProvider` against the OpenAI-compatible
//! `/chat/completions` endpoint, with native function calling and
//! `response_format: json_object` support.

use std::collections::HashMap;
use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{ChatProvider, ChatRequest, Completion, FinishReason, TokenUsage, ToolChoice},
    tool::ToolCall,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// API key (bearer token)
    pub api_key: String,

    /// Base URL of an OpenAI-compatible API
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".into(),
            timeout_secs: 60,
        }
    }
}

impl OpenAiConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AgentError::Config("OPENAI_API_KEY is not set".into()))?;
        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Ok(Self {
            api_key,
            base_url,
            timeout_secs,
        })
    }
}

/// OpenAI-compatible chat-completions provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Create from configuration
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OpenAiConfig::from_env()?)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Convert agent messages to the wire format
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| WireMessage {
                role: match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::Tool => "tool",
                }
                .into(),
                content: if m.content.is_empty() && !m.tool_calls.is_empty() {
                    None
                } else {
                    Some(m.content.clone())
                },
                tool_calls: if m.tool_calls.is_empty() {
                    None
                } else {
                    Some(m.tool_calls.iter().map(WireToolCall::from_call).collect())
                },
                tool_call_id: m.tool_call_id.clone(),
            })
            .collect()
    }

    /// Convert a wire response to an agent completion
    fn convert_completion(response: WireResponse, model: &str) -> Result<Completion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("response contained no choices".into()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(WireToolCall::into_call)
            .collect::<Result<Vec<_>>>()?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("stop") => Some(FinishReason::Stop),
            Some("length") => Some(FinishReason::Length),
            Some("tool_calls") => Some(FinishReason::ToolUse),
            Some("content_filter") => Some(FinishReason::ContentFilter),
            _ => None,
        };

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            model: model.to_string(),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason,
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<Completion> {
        let tools: Vec<serde_json::Value> = request
            .tools
            .iter()
            .map(|schema| {
                serde_json::json!({
                    "type": "function",
                    "function": schema.to_function_object(),
                })
            })
            .collect();

        let body = WireRequest {
            model: request.options.model.clone(),
            messages: Self::convert_messages(request.messages),
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
            tools: if tools.is_empty() { None } else { Some(tools) },
            tool_choice: match (request.tools.is_empty(), request.tool_choice) {
                (true, _) => None,
                (false, ToolChoice::Auto) => Some("auto".into()),
                (false, ToolChoice::None) => Some("none".into()),
            },
            response_format: request
                .json_object
                .then(|| serde_json::json!({"type": "json_object"})),
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail: String = detail.chars().take(300).collect();
            return Err(match status.as_u16() {
                401 | 403 => AgentError::Auth(detail),
                429 => AgentError::RateLimited(detail),
                _ => AgentError::Provider(format!("HTTP {status}: {detail}")),
            });
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("malformed response: {e}")))?;

        Self::convert_completion(wire, &request.options.model)
    }

    fn name(&self) -> &str {
        "OpenAI"
    }
}

// Wire types for the chat-completions API.

#[derive(Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: WireFunctionCall,
}

#[derive(Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded argument object, as the API transmits it
    arguments: String,
}

impl WireToolCall {
    fn from_call(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone().unwrap_or_default(),
            call_type: "function".into(),
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: serde_json::to_string(&call.arguments).unwrap_or_else(|_| "{}".into()),
            },
        }
    }

    fn into_call(self) -> Result<ToolCall> {
        let arguments: HashMap<String, serde_json::Value> =
            serde_json::from_str(&self.function.arguments).map_err(|e| {
                AgentError::Parse(format!(
                    "tool call '{}' carried unparseable arguments: {e}",
                    self.function.name
                ))
            })?;

        Ok(ToolCall {
            id: Some(self.id),
            name: self.function.name,
            arguments,
        })
    }
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OpenAiConfig::default();
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_message_conversion_tool_turns() {
        let call = ToolCall {
            id: Some("call_0".into()),
            name: "search_market_news".into(),
            arguments: HashMap::from([("query".to_string(), serde_json::json!("bitcoin"))]),
        };
        let messages = vec![
            Message::system("You are an analyst."),
            Message::assistant_tool_calls("", vec![call]),
            Message::tool("- headline", Some("call_0".into())),
        ];

        let wire = OpenAiProvider::convert_messages(&messages);
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[1].role, "assistant");
        assert!(wire[1].content.is_none());
        let calls = wire[1].tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "search_market_news");
        assert!(calls[0].function.arguments.contains("bitcoin"));
        assert_eq!(wire[2].tool_call_id.as_deref(), Some("call_0"));
    }

    #[test]
    fn test_completion_conversion_parses_tool_calls() {
        let wire: WireResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {
                            "name": "get_market_quote",
                            "arguments": "{\"symbol\": \"BTC/USDT\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();

        let completion = OpenAiProvider::convert_completion(wire, "gpt-4o").unwrap();
        assert!(completion.wants_tools());
        assert_eq!(completion.tool_calls[0].name, "get_market_quote");
        assert_eq!(
            completion.tool_calls[0].str_arg("symbol"),
            Some("BTC/USDT")
        );
        assert_eq!(completion.finish_reason, Some(FinishReason::ToolUse));
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }
}
