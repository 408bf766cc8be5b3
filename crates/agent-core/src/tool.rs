//! Tool System
//!
//! Extensible tool framework for agent capabilities. Tools are registered
//! at startup and invoked by the engine when the model requests them.
//!
//! Dispatch never fails the cycle: an unknown tool name, a bad argument
//! set or a handler error all fold into a failure `ToolResult` whose
//! output is the error text, so the model can self-correct on its next
//! turn.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Tool call request from the LLM
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID assigned by the provider (generated if absent)
    #[serde(default)]
    pub id: Option<String>,

    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs
    pub arguments: HashMap<String, serde_json::Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: HashMap<String, serde_json::Value>) -> Self {
        Self {
            id: Some(uuid::Uuid::new_v4().to_string()),
            name: name.into(),
            arguments,
        }
    }

    /// Fetch a string argument
    pub fn str_arg(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(|v| v.as_str())
    }

    /// Fetch an integer argument
    pub fn int_arg(&self, name: &str) -> Option<i64> {
        self.arguments.get(name).and_then(|v| v.as_i64())
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (success text or error text)
    pub output: String,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
        }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<serde_json::Value>>,
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,
}

impl ToolSchema {
    /// Render the parameters as a JSON Schema object suitable for
    /// function-calling wire formats.
    pub fn to_function_object(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let mut prop = serde_json::Map::new();
            prop.insert("type".into(), serde_json::json!(param.param_type));
            prop.insert("description".into(), serde_json::json!(param.description));
            if let Some(values) = &param.enum_values {
                prop.insert("enum".into(), serde_json::json!(values));
            }
            properties.insert(param.name.clone(), serde_json::Value::Object(prop));

            if param.required {
                required.push(serde_json::json!(param.name));
            }
        }

        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            },
        })
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Validate arguments before execution (optional)
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            if param.required && !call.arguments.contains_key(&param.name) {
                return Err(AgentError::ToolValidation(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

/// Registry for available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_boxed(Arc::new(tool));
    }

    /// Register a boxed tool
    pub fn register_boxed(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.schema().name;
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Dispatch a tool call, folding every failure mode into an
    /// error-text result. This boundary must never abort the cycle.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        let Some(tool) = self.get(&call.name) else {
            tracing::warn!(tool = %call.name, "model requested unknown tool");
            return ToolResult::failure(
                &call.name,
                format!("Error: unknown tool '{}'", call.name),
            )
            .with_id(call.id.clone());
        };

        if let Err(e) = tool.validate(call) {
            return ToolResult::failure(&call.name, format!("Error: {e}")).with_id(call.id.clone());
        }

        match tool.execute(call).await {
            Ok(result) => result.with_id(call.id.clone()),
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "tool execution failed");
                ToolResult::failure(&call.name, format!("Error: {e}")).with_id(call.id.clone())
            }
        }
    }

    /// Get all tool schemas, in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.schema())
            .collect()
    }

    /// Get tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".into(),
                description: "Echo the input back".into(),
                parameters: vec![ParameterSchema {
                    name: "text".into(),
                    param_type: "string".into(),
                    description: "Text to echo".into(),
                    required: true,
                    enum_values: None,
                }],
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            let text = call
                .str_arg("text")
                .ok_or_else(|| AgentError::ToolValidation("Missing text".into()))?;
            Ok(ToolResult::success("echo", text))
        }
    }

    fn call(name: &str, args: serde_json::Value) -> ToolCall {
        let arguments = args
            .as_object()
            .map(|m| m.clone().into_iter().collect())
            .unwrap_or_default();
        ToolCall {
            id: Some("call_0".into()),
            name: name.into(),
            arguments,
        }
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let result = registry
            .dispatch(&call("echo", serde_json::json!({"text": "hi"})))
            .await;
        assert!(result.success);
        assert_eq!(result.output, "hi");
        assert_eq!(result.id.as_deref(), Some("call_0"));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool_is_not_fatal() {
        let registry = ToolRegistry::new();

        let result = registry.dispatch(&call("nope", serde_json::json!({}))).await;
        assert!(!result.success);
        assert!(result.output.contains("unknown tool"));
    }

    #[tokio::test]
    async fn test_dispatch_missing_argument_is_not_fatal() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let result = registry.dispatch(&call("echo", serde_json::json!({}))).await;
        assert!(!result.success);
        assert!(result.output.contains("Missing required parameter"));
    }

    #[test]
    fn test_function_object_shape() {
        let schema = EchoTool.schema();
        let obj = schema.to_function_object();
        assert_eq!(obj["name"], "echo");
        assert_eq!(obj["parameters"]["type"], "object");
        assert_eq!(obj["parameters"]["required"][0], "text");
        assert_eq!(obj["parameters"]["properties"]["text"]["type"], "string");
    }

    #[test]
    fn test_registry_order() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["echo"]);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("unknown").is_none());
    }
}
